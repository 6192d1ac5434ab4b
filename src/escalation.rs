//! Crisis banner, helpline modal and panic overlay.
//!
//! Flows never touch these presentations directly. They publish an
//! [`EscalationSignal`] on the [`EscalationBus`]; the renderer task started
//! by [`spawn_renderer`] is the only subscriber that mutates the shared
//! [`EscalationView`]. While the panic overlay is visible a breathing loop
//! cycles through the four [`BreathPhase`]s.

use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{Mutex, Notify, broadcast},
    task::JoinHandle,
    time::{sleep, timeout},
};
use tracing::{debug, info, warn};

pub type SharedEscalation = Arc<Mutex<EscalationView>>;

const BUS_CAPACITY: usize = 16;
const RENDER_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationSignal {
    CrisisBanner,
    PanicOverlay,
}

/// A signal on the bus together with the renderer's acknowledgement.
#[derive(Debug, Clone)]
pub struct Escalation {
    pub signal: EscalationSignal,
    applied: Arc<Notify>,
}

impl Escalation {
    /// Tells the publisher the signal is now reflected in the view.
    pub fn mark_applied(&self) {
        self.applied.notify_one();
    }
}

#[derive(Debug, Clone)]
pub struct EscalationBus {
    tx: broadcast::Sender<Escalation>,
}

impl Default for EscalationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EscalationBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Publishes `signal` and waits until a renderer has applied it, so a
    /// snapshot taken afterwards already shows the banner or overlay.
    pub async fn publish(&self, signal: EscalationSignal) {
        info!(?signal, "escalation raised");
        let applied = Arc::new(Notify::new());
        let escalation = Escalation {
            signal,
            applied: Arc::clone(&applied),
        };
        if self.tx.send(escalation).is_err() {
            warn!(?signal, "no escalation renderer is listening");
            return;
        }
        if timeout(RENDER_TIMEOUT, applied.notified()).await.is_err() {
            warn!(?signal, "escalation was not rendered in time");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Escalation> {
        self.tx.subscribe()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathPhase {
    Inhale,
    HoldFull,
    Exhale,
    HoldEmpty,
}

impl BreathPhase {
    pub fn duration(self) -> Duration {
        match self {
            Self::Inhale | Self::HoldFull => Duration::from_secs(4),
            Self::Exhale => Duration::from_secs(6),
            Self::HoldEmpty => Duration::from_secs(2),
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Inhale => Self::HoldFull,
            Self::HoldFull => Self::Exhale,
            Self::Exhale => Self::HoldEmpty,
            Self::HoldEmpty => Self::Inhale,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Self::Inhale => "Breathe In (4s)",
            Self::HoldFull => "Hold (4s)",
            Self::Exhale => "Breathe Out (6s)",
            Self::HoldEmpty => "Hold (2s)",
        }
    }

    pub fn scale(self) -> f32 {
        match self {
            Self::Inhale | Self::HoldFull => 1.5,
            Self::Exhale | Self::HoldEmpty => 1.0,
        }
    }

    /// Fill opacity of the breathing circle.
    pub fn fill(self) -> f32 {
        match self {
            Self::Inhale => 0.3,
            Self::HoldFull => 0.5,
            Self::Exhale => 0.2,
            Self::HoldEmpty => 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseView {
    pub phase: BreathPhase,
    pub prompt: &'static str,
    pub scale: f32,
    pub fill: f32,
    pub duration_ms: u64,
}

impl From<BreathPhase> for PhaseView {
    fn from(phase: BreathPhase) -> Self {
        Self {
            phase,
            prompt: phase.prompt(),
            scale: phase.scale(),
            fill: phase.fill(),
            duration_ms: phase.duration().as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OverlayState {
    pub visible: bool,
    pub phase: Option<PhaseView>,
    /// Phases applied since the overlay was last shown.
    pub transitions: u64,
    #[serde(skip)]
    generation: u64,
}

impl OverlayState {
    fn is_current(&self, generation: u64) -> bool {
        self.visible && self.generation == generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrisisBanner {
    pub headline: &'static str,
    pub call_label: &'static str,
    pub call_href: &'static str,
    pub counselor_label: &'static str,
}

impl Default for CrisisBanner {
    fn default() -> Self {
        Self {
            headline: "IMMEDIATE HELP AVAILABLE",
            call_label: "Call 988",
            call_href: "tel:988",
            counselor_label: "Request Counselor",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EscalationView {
    pub banner: Option<CrisisBanner>,
    pub helpline_modal_open: bool,
    pub overlay: OverlayState,
}

impl EscalationView {
    /// Mounts the banner and opens the helpline modal. The banner is never
    /// mounted twice.
    pub fn show_crisis(&mut self) {
        if self.banner.is_none() {
            self.banner = Some(CrisisBanner::default());
        }
        self.helpline_modal_open = true;
    }

    pub fn open_helpline(&mut self) {
        self.helpline_modal_open = true;
    }

    pub fn close_helpline(&mut self) {
        self.helpline_modal_open = false;
    }

    /// Called when the chat surface holding the banner is cleared.
    pub fn clear_banner(&mut self) {
        self.banner = None;
    }

    /// Makes the overlay visible and returns the generation the new
    /// breathing loop must run under, or `None` if it was already showing.
    pub fn show_overlay(&mut self) -> Option<u64> {
        if self.overlay.visible {
            return None;
        }
        self.overlay.visible = true;
        self.overlay.generation += 1;
        self.overlay.transitions = 0;
        self.overlay.phase = Some(PhaseView::from(BreathPhase::Inhale));
        Some(self.overlay.generation)
    }

    pub fn hide_overlay(&mut self) {
        self.overlay.visible = false;
        self.overlay.phase = None;
    }
}

/// Starts the task that turns published signals into view changes.
pub fn spawn_renderer(bus: &EscalationBus, view: SharedEscalation) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(escalation) => {
                    render(&view, escalation.signal).await;
                    escalation.mark_applied();
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "escalation renderer fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

pub async fn render(view: &SharedEscalation, signal: EscalationSignal) {
    match signal {
        EscalationSignal::CrisisBanner => view.lock().await.show_crisis(),
        EscalationSignal::PanicOverlay => {
            let generation = view.lock().await.show_overlay();
            match generation {
                Some(generation) => {
                    tokio::spawn(breathe(Arc::clone(view), generation));
                }
                None => debug!("panic overlay already visible"),
            }
        }
    }
}

/// Cycles the breathing phases until the overlay showing identified by
/// `generation` is hidden. Visibility is checked before every phase.
pub async fn breathe(view: SharedEscalation, generation: u64) {
    let mut phase = BreathPhase::Inhale;
    loop {
        let duration = {
            let mut view = view.lock().await;
            if !view.overlay.is_current(generation) {
                debug!(generation, "breathing loop stopped");
                return;
            }
            view.overlay.phase = Some(PhaseView::from(phase));
            view.overlay.transitions += 1;
            phase.duration()
        };
        sleep(duration).await;
        phase = phase.next();
    }
}
