pub fn render_index(username: &str) -> String {
    INDEX_HTML.replace("{{USERNAME}}", &escape_html(username))
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Wellness Companion</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef6f1;
      --bg-2: #bfe3d0;
      --ink: #24302b;
      --accent: #2f8f6b;
      --accent-2: #2f4858;
      --danger: #c63b2b;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e3f1ea 60%, #f4f9f6 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      display: grid;
      gap: 24px;
      animation: rise 600ms ease;
    }

    .card {
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 28px;
      display: grid;
      gap: 16px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    h2 {
      margin: 0;
      font-size: 1.3rem;
    }

    .subtitle {
      margin: 0;
      color: #5f6b65;
    }

    .row {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
      transition: transform 150ms ease;
    }

    button.secondary {
      background: var(--accent-2);
    }

    button.danger {
      background: var(--danger);
    }

    button:disabled {
      opacity: 0.45;
      cursor: not-allowed;
    }

    button:active {
      transform: scale(0.98);
    }

    input, select, textarea {
      font: inherit;
      border-radius: 14px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      padding: 10px 14px;
    }

    .bar {
      height: 10px;
      border-radius: 999px;
      background: rgba(47, 72, 88, 0.1);
      overflow: hidden;
    }

    .bar > div {
      height: 100%;
      background: var(--accent);
      transition: width 300ms ease;
    }

    .banner {
      background: var(--danger);
      color: white;
      border-radius: 16px;
      padding: 12px 16px;
      font-weight: 600;
    }

    .banner a, .banner button {
      color: white;
      background: transparent;
      text-decoration: underline;
      padding: 0 6px;
    }

    .transcript {
      max-height: 320px;
      overflow-y: auto;
      display: grid;
      gap: 8px;
    }

    .msg {
      padding: 10px 14px;
      border-radius: 16px;
      max-width: 85%;
      background: white;
    }

    .msg.user {
      justify-self: end;
      background: var(--accent);
      color: white;
    }

    .overlay, .modal {
      position: fixed;
      inset: 0;
      display: grid;
      place-items: center;
      background: rgba(20, 40, 60, 0.85);
      color: white;
      z-index: 10;
    }

    .modal .card {
      color: var(--ink);
      width: min(480px, 92vw);
    }

    .breath {
      width: 180px;
      height: 180px;
      border-radius: 50%;
      border: 4px solid #93c5fd;
      display: grid;
      place-items: center;
      transition: all 1s ease-in-out;
    }

    .hidden {
      display: none !important;
    }

    .status {
      font-size: 0.95rem;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: var(--danger);
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(18px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header class="card">
      <h1>Hi {{USERNAME}}</h1>
      <p class="subtitle">Check in, grow your plant, and reach out when you need to.</p>
      <div class="row">
        <button type="button" id="stress-start">30-second stress check</button>
        <button type="button" class="secondary" id="get-help">Talk to a counselor</button>
      </div>
      <div class="status" id="status"></div>
    </header>

    <section class="card" id="plant">
      <h2>Wellness plant <span id="plant-level"></span> · <span id="plant-stage"></span></h2>
      <div class="bar"><div id="xp-bar" style="width: 0%"></div></div>
      <p class="subtitle" id="xp-text"></p>
      <div class="row" id="tasks">
        <label><input type="checkbox" class="wellness-task" id="hydrate" data-points="2" /> Drink water (+2)</label>
        <label><input type="checkbox" class="wellness-task" id="walk" data-points="3" /> Short walk (+3)</label>
        <label><input type="checkbox" class="wellness-task" id="journal" data-points="2" /> Journal (+2)</label>
        <label><input type="checkbox" class="wellness-task" id="sleep-early" data-points="3" /> Sleep early (+3)</label>
      </div>
      <div class="row">
        <span>Droplets: <strong id="droplets">0</strong></span>
        <button type="button" id="water">Water plant</button>
      </div>
    </section>

    <section class="card" id="chat-interface">
      <div class="row">
        <h2>Willow</h2>
        <button type="button" class="secondary" id="voice-toggle">Voice: off</button>
        <button type="button" class="secondary" id="chat-clear">Clear</button>
      </div>
      <div id="crisis-banner" class="banner hidden">
        <span id="banner-text"></span>
        <a id="banner-call" href="tel:988"></a>
        <button type="button" id="banner-counselor"></button>
      </div>
      <div class="transcript" id="chat-box"></div>
      <form class="row" id="chat-form">
        <input id="user-input" placeholder="Type your message..." autocomplete="off" style="flex: 1" />
        <button type="submit">Send</button>
      </form>
    </section>
  </main>

  <div class="modal hidden" id="stress-modal">
    <div class="card">
      <div class="bar"><div id="check-progress" style="width: 0%"></div></div>
      <div class="step hidden" data-step="select_source">
        <h2>What's weighing on you?</h2>
        <div class="row">
          <button type="button" data-source="exam_deadline">Exam/Deadline</button>
          <button type="button" data-source="overthinking">Overthinking</button>
          <button type="button" data-source="relationships">Relationships</button>
          <button type="button" data-source="sleep">Sleep</button>
          <button type="button" data-source="money">Money</button>
          <button type="button" data-source="other">Something else</button>
        </div>
      </div>
      <div class="step hidden" data-step="rate_intensity">
        <h2>How intense is it?</h2>
        <input type="range" min="0" max="10" value="5" id="intensity-slider" />
        <strong id="intensity-value">5/10</strong>
        <button type="button" id="intensity-confirm">Next</button>
      </div>
      <div class="step hidden" data-step="crisis">
        <h2>That sounds really heavy.</h2>
        <p>You don't have to handle this alone. Try a guided breathing reset first, or reach out for help.</p>
        <div class="row">
          <button type="button" class="danger" id="crisis-panic">Breathe with me</button>
          <button type="button" class="secondary" id="crisis-override">Continue anyway</button>
        </div>
      </div>
      <div class="step hidden" data-step="choose_time">
        <h2>How much time do you have?</h2>
        <div class="row">
          <button type="button" data-minutes="2">2 min</button>
          <button type="button" data-minutes="5">5 min</button>
          <button type="button" data-minutes="10">10 min</button>
        </div>
      </div>
      <button type="button" class="secondary" id="stress-cancel">Close</button>
    </div>
  </div>

  <div class="modal hidden" id="triage-modal">
    <div class="card">
      <div class="step hidden" data-step="safety_check">
        <h2>Are you in immediate danger?</h2>
        <div class="row">
          <button type="button" class="danger" id="safety-yes">Yes</button>
          <button type="button" class="secondary" id="safety-no">No</button>
        </div>
      </div>
      <form class="step hidden" data-step="form" id="triage-form">
        <h2>Request a counselor</h2>
        <select id="severity">
          <option value="low">Low</option>
          <option value="medium" selected>Medium</option>
          <option value="high">High</option>
          <option value="crisis">Crisis</option>
        </select>
        <textarea id="triage-message" rows="4" placeholder="What's going on?"></textarea>
        <p class="status" data-type="error" id="triage-error"></p>
        <button type="submit" id="triage-submit">Send request</button>
      </form>
      <div class="step hidden" data-step="confirmation">
        <h2 id="confirm-headline"></h2>
        <p id="confirm-body"></p>
        <p id="confirm-peer"></p>
      </div>
      <button type="button" class="secondary" id="triage-close">Close</button>
    </div>
  </div>

  <div class="modal hidden" id="helpline-modal">
    <div class="card">
      <h2>You're not alone</h2>
      <p>Please reach out right now. Call <a href="tel:988">988</a> for immediate support.</p>
      <button type="button" id="helpline-close">Close</button>
    </div>
  </div>

  <div class="overlay hidden" id="panic-overlay">
    <div class="row" style="flex-direction: column">
      <div class="breath" id="breath-circle"><span id="breath-text"></span></div>
      <button type="button" class="secondary" id="exit-panic">I feel calmer</button>
    </div>
  </div>

  <script>
    const $ = (id) => document.getElementById(id);
    const statusEl = $('status');
    let snapshot = null;

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const showStep = (modal, step) => {
      modal.querySelectorAll('.step').forEach((el) => {
        el.classList.toggle('hidden', el.dataset.step !== step);
      });
    };

    const render = (data) => {
      snapshot = data;
      const p = data.progress;
      $('plant-level').textContent = `Lv.${p.level}`;
      $('plant-stage').textContent = p.stage_label;
      $('xp-bar').style.width = `${p.progress_pct}%`;
      $('xp-text').textContent = `${p.xp} / ${p.xp_needed} XP`;
      $('droplets').textContent = p.droplets;
      $('water').disabled = !p.can_water;
      document.querySelectorAll('.wellness-task').forEach((task) => {
        task.checked = p.completed_task_ids.includes(task.id);
      });

      const check = data.stress_check;
      $('stress-modal').classList.toggle('hidden', check.state.step === 'closed');
      showStep($('stress-modal'), check.state.step);
      $('check-progress').style.width = `${check.progress_pct}%`;
      if (check.state.intensity !== undefined) {
        $('intensity-value').textContent = `${check.state.intensity}/10`;
        $('intensity-value').dataset.band = check.band || '';
      }

      const triage = data.triage;
      $('triage-modal').classList.toggle('hidden', triage.state.step === 'closed');
      showStep($('triage-modal'), triage.state.step);
      if (triage.state.step === 'form') {
        $('triage-submit').disabled = triage.state.submitting;
        $('triage-error').textContent = triage.state.error || '';
      }
      if (triage.confirmation) {
        $('confirm-headline').textContent = triage.confirmation.headline;
        $('confirm-body').textContent = triage.confirmation.body;
        const peer = triage.confirmation.peer_line;
        $('confirm-peer').innerHTML = peer
          ? `${peer.label}: <a href="${peer.href}">${peer.number}</a>`
          : '';
      }

      const chatBox = $('chat-box');
      chatBox.innerHTML = '';
      data.chat.transcript.forEach((msg) => {
        const div = document.createElement('div');
        div.className = `msg ${msg.sender}`;
        div.textContent = msg.text;
        chatBox.appendChild(div);
      });
      chatBox.scrollTop = chatBox.scrollHeight;
      $('voice-toggle').textContent = `Voice: ${data.chat.voice_enabled ? 'on' : 'off'}`;

      const esc = data.escalation;
      $('crisis-banner').classList.toggle('hidden', !esc.banner);
      if (esc.banner) {
        $('banner-text').textContent = esc.banner.headline;
        $('banner-call').textContent = esc.banner.call_label;
        $('banner-call').href = esc.banner.call_href;
        $('banner-counselor').textContent = esc.banner.counselor_label;
      }
      $('helpline-modal').classList.toggle('hidden', !esc.helpline_modal_open);
      $('panic-overlay').classList.toggle('hidden', !esc.overlay.visible);
      const phase = esc.overlay.phase;
      if (phase) {
        const circle = $('breath-circle');
        circle.style.transform = `scale(${phase.scale})`;
        circle.style.transitionDuration = `${phase.duration_ms}ms`;
        circle.style.background = `rgba(96, 165, 250, ${phase.fill})`;
        $('breath-text').textContent = phase.prompt;
      }
    };

    const applyEffects = (effects) => {
      effects.forEach((effect) => {
        switch (effect.type) {
          case 'prefill_chat':
            $('user-input').value = effect.text;
            $('chat-interface').scrollIntoView({ behavior: 'smooth' });
            $('user-input').focus();
            break;
          case 'navigate':
            window.location.href = effect.path;
            break;
          case 'dial':
            window.location.href = effect.href;
            break;
          case 'show_error':
            setStatus(effect.message, 'error');
            break;
          case 'speak':
            if ('speechSynthesis' in window) {
              speechSynthesis.cancel();
              speechSynthesis.speak(new SpeechSynthesisUtterance(effect.text));
            }
            break;
          case 'celebrate':
            setStatus(`Level Up! Your plant is now Level ${effect.level}!`, 'ok');
            break;
          default:
            break;
        }
      });
    };

    const post = async (url, body) => {
      const res = await fetch(url, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body || {})
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      const data = await res.json();
      render(data.snapshot);
      applyEffects(data.effects);
    };

    const act = (url, body) => post(url, body).catch((err) => setStatus(err.message, 'error'));
    const stress = (event) => act('/api/stress-check', event);
    const triage = (event) => act('/api/triage', event);

    $('stress-start').addEventListener('click', () => stress({ type: 'start' }));
    $('stress-cancel').addEventListener('click', () => stress({ type: 'cancel' }));
    document.querySelectorAll('[data-source]').forEach((button) => {
      button.addEventListener('click', () => stress({ type: 'select_source', source: button.dataset.source }));
    });
    $('intensity-slider').addEventListener('change', (event) => {
      stress({ type: 'set_intensity', intensity: Number(event.target.value) });
    });
    $('intensity-confirm').addEventListener('click', () => stress({ type: 'confirm_intensity' }));
    $('crisis-override').addEventListener('click', () => stress({ type: 'override_crisis' }));
    $('crisis-panic').addEventListener('click', () => stress({ type: 'start_panic' }));
    document.querySelectorAll('[data-minutes]').forEach((button) => {
      button.addEventListener('click', () => stress({ type: 'select_time', minutes: Number(button.dataset.minutes) }));
    });

    $('get-help').addEventListener('click', () => triage({ type: 'open' }));
    $('triage-close').addEventListener('click', () => triage({ type: 'close' }));
    $('safety-yes').addEventListener('click', () => triage({ type: 'answer_safety', in_danger: true }));
    $('safety-no').addEventListener('click', () => triage({ type: 'answer_safety', in_danger: false }));
    $('triage-form').addEventListener('submit', (event) => {
      event.preventDefault();
      $('triage-submit').disabled = true;
      triage({ type: 'submit', severity: $('severity').value, message: $('triage-message').value });
    });

    $('chat-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const message = $('user-input').value.trim();
      if (!message) {
        return;
      }
      $('user-input').value = '';
      act('/api/chat', { message });
    });
    $('chat-clear').addEventListener('click', () => act('/api/chat/clear'));
    $('voice-toggle').addEventListener('click', () => act('/api/chat/voice', { enabled: !snapshot.chat.voice_enabled }));
    $('banner-counselor').addEventListener('click', () => act('/api/escalation/request-counselor'));
    $('helpline-close').addEventListener('click', () => act('/api/escalation/helpline/close'));
    $('exit-panic').addEventListener('click', () => act('/api/escalation/panic/close'));

    document.querySelectorAll('.wellness-task').forEach((task) => {
      task.addEventListener('change', () => {
        act(`/api/progress/tasks/${task.id}`, { completed: task.checked, points: Number(task.dataset.points) });
      });
    });
    $('water').addEventListener('click', () => act('/api/progress/water'));

    const refresh = async () => {
      const res = await fetch('/api/session');
      if (res.ok) {
        render(await res.json());
      }
    };

    refresh().catch((err) => setStatus(err.message, 'error'));
    setInterval(() => {
      if (snapshot && snapshot.escalation.overlay.visible) {
        refresh().catch(() => {});
      }
    }, 1000);
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_escaped_into_page() {
        let page = render_index("<Sam & Co>");
        assert!(page.contains("Hi &lt;Sam &amp; Co&gt;"));
        assert!(!page.contains("{{USERNAME}}"));
    }
}
