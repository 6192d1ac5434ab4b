//! Interprets flow effects against the live session.

use crate::flow::Effect;
use crate::session::StressLogStatus;
use crate::state::AppState;
use crate::stress_check::StressSource;
use crate::triage::{HelpOutcome, TriageEvent};
use std::collections::VecDeque;
use tokio::task::JoinHandle;
use tracing::{info, warn};

impl AppState {
    /// Carries out `effects` in order and returns the ones the page renders.
    /// Effects produced along the way (a counselor response feeding back
    /// into the triage flow) are queued behind the current ones.
    pub async fn run_effects(&self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut pending = VecDeque::from(effects);
        let mut rendered = Vec::new();

        while let Some(effect) = pending.pop_front() {
            match effect {
                Effect::LogStress { level, source } => {
                    self.log_stress(level, source);
                }
                Effect::Escalate { signal } => self.bus.publish(signal).await,
                Effect::SubmitHelpRequest { request } => {
                    let outcome = HelpOutcome::from(self.backend.request_help(&request).await);
                    info!(?outcome, "counselor request finished");
                    let mut session = self.session.lock().await;
                    match session.apply_triage_outcome(outcome) {
                        Ok(more) => pending.extend(more),
                        Err(err) => warn!("dropping counselor response: {err}"),
                    }
                }
                Effect::OpenTriage => {
                    let mut session = self.session.lock().await;
                    if let Ok(more) = session.apply_triage(TriageEvent::Open) {
                        pending.extend(more);
                    }
                }
                Effect::AppendTranscript { message } => {
                    self.session.lock().await.chat.push(message);
                }
                Effect::ShowHelplineModal => {
                    self.escalation.lock().await.open_helpline();
                }
                other => rendered.push(other),
            }
        }

        rendered
    }

    /// Reports a stress level without waiting for the backend. The outcome
    /// is recorded on the session; failures are only logged.
    pub fn log_stress(&self, level: u8, source: StressSource) -> JoinHandle<()> {
        let backend = self.backend.clone();
        let session = self.session.clone();
        tokio::spawn(async move {
            let status = match backend.log_stress(level, source).await {
                Ok(()) => StressLogStatus::Logged,
                Err(err) => {
                    warn!(level, "failed to log stress level: {err}");
                    StressLogStatus::Failed {
                        message: err.user_message(),
                    }
                }
            };
            session.lock().await.stress_log = Some(status);
        })
    }
}
