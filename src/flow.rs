//! Shared vocabulary for the session flows.
//!
//! Every flow is a tagged state enum with a pure transition
//! `(state, event) -> (state, effects)`. Effects are interpreted by the
//! runtime in order: some are carried out in-process (logging a stress
//! level, publishing an escalation, sending a counselor request), the rest
//! are handed to the page to render.

use crate::chat::ChatMessage;
use crate::escalation::EscalationSignal;
use crate::models::HelpRequest;
use crate::stress_check::StressSource;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("cannot {event} while {state}")]
    UnexpectedEvent {
        state: &'static str,
        event: &'static str,
    },
    #[error("a counselor request is already being sent")]
    SubmissionInFlight,
}

impl FlowError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn unexpected(state: &'static str, event: &'static str) -> Self {
        Self::UnexpectedEvent { state, event }
    }
}

pub type Transition<S> = Result<(S, Vec<Effect>), FlowError>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Fire-and-forget report of a confirmed stress level.
    LogStress { level: u8, source: StressSource },
    Escalate { signal: EscalationSignal },
    SubmitHelpRequest { request: HelpRequest },
    OpenTriage,
    AppendTranscript { message: ChatMessage },
    ShowHelplineModal,
    /// Puts text into the chat input and focuses it without sending.
    PrefillChat { text: String },
    Navigate { path: String },
    Dial { href: String },
    ShowError { message: String },
    Speak { text: String },
    Celebrate { level: u32 },
}

impl Effect {
    pub fn navigate(path: &str) -> Self {
        Self::Navigate {
            path: path.to_string(),
        }
    }

    pub fn show_error(message: impl Into<String>) -> Self {
        Self::ShowError {
            message: message.into(),
        }
    }
}
