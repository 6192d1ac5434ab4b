//! Counselor request: safety check, request form, confirmation.

use crate::backend::BackendError;
use crate::flow::{Effect, FlowError, Transition};
use crate::models::{HelpAccepted, HelpRequest, Severity};
use serde::{Deserialize, Serialize};

pub const EMERGENCY_DIAL: &str = "tel:01127666806";
pub const LOGIN_PATH: &str = "/login";
pub const LOGIN_REQUIRED: &str = "Please log in to request counselor support.";
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
pub const CONNECTION_FAILURE: &str = "Failed to send request. Please check your connection.";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TriageState {
    #[default]
    Closed,
    SafetyCheck,
    Form {
        submitting: bool,
        error: Option<String>,
    },
    Confirmation {
        after_hours: bool,
    },
}

impl TriageState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::SafetyCheck => "on the safety check",
            Self::Form { .. } => "on the request form",
            Self::Confirmation { .. } => "showing the confirmation",
        }
    }

    pub fn confirmation(&self) -> Option<ConfirmationCopy> {
        match self {
            Self::Confirmation { after_hours } => Some(confirmation_copy(*after_hours)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriageEvent {
    Open,
    AnswerSafety { in_danger: bool },
    Submit { severity: Severity, message: String },
    Close,
}

impl TriageEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Open => "open the request",
            Self::AnswerSafety { .. } => "answer the safety check",
            Self::Submit { .. } => "submit the request",
            Self::Close => "close the request",
        }
    }
}

/// How the help-request call ended, as far as the flow cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpOutcome {
    Accepted { after_hours: bool },
    Unauthorized,
    Rejected { message: Option<String> },
    Unreachable,
}

impl From<Result<HelpAccepted, BackendError>> for HelpOutcome {
    fn from(result: Result<HelpAccepted, BackendError>) -> Self {
        match result {
            Ok(accepted) => Self::Accepted {
                after_hours: accepted.after_hours,
            },
            Err(BackendError::Unauthorized) => Self::Unauthorized,
            Err(BackendError::Server { message, .. }) => Self::Rejected { message },
            Err(BackendError::Decode(_)) => Self::Rejected { message: None },
            Err(BackendError::Network(_)) => Self::Unreachable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeerLine {
    pub label: &'static str,
    pub number: &'static str,
    pub href: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfirmationCopy {
    pub headline: &'static str,
    pub body: &'static str,
    pub peer_line: Option<PeerLine>,
}

pub fn confirmation_copy(after_hours: bool) -> ConfirmationCopy {
    if after_hours {
        ConfirmationCopy {
            headline: "Request Received!",
            body: "Our counselors are currently offline (Hours: 9am-5pm). We have sent your request for priority review in the morning.",
            peer_line: Some(PeerLine {
                label: "Need someone now? Call the 24/7 Peer Support Line",
                number: "123-456-7890",
                href: "tel:1234567890",
            }),
        }
    } else {
        ConfirmationCopy {
            headline: "Request Received!",
            body: "We've received your request. A campus counselor will reach out to you as soon as possible.",
            peer_line: None,
        }
    }
}

pub fn apply(state: &TriageState, event: TriageEvent) -> Transition<TriageState> {
    match (state, event) {
        (_, TriageEvent::Open) => Ok((TriageState::SafetyCheck, Vec::new())),
        (_, TriageEvent::Close) => Ok((TriageState::Closed, Vec::new())),
        (TriageState::SafetyCheck, TriageEvent::AnswerSafety { in_danger: true }) => Ok((
            TriageState::Closed,
            vec![
                Effect::Dial {
                    href: EMERGENCY_DIAL.to_string(),
                },
                Effect::ShowHelplineModal,
            ],
        )),
        (TriageState::SafetyCheck, TriageEvent::AnswerSafety { in_danger: false }) => Ok((
            TriageState::Form {
                submitting: false,
                error: None,
            },
            Vec::new(),
        )),
        (TriageState::Form { submitting: true, .. }, TriageEvent::Submit { .. }) => {
            Err(FlowError::SubmissionInFlight)
        }
        (TriageState::Form { .. }, TriageEvent::Submit { severity, message }) => {
            let message = message.trim();
            if message.is_empty() {
                return Err(FlowError::invalid("Please tell us a little about what's going on."));
            }
            Ok((
                TriageState::Form {
                    submitting: true,
                    error: None,
                },
                vec![Effect::SubmitHelpRequest {
                    request: HelpRequest {
                        severity,
                        message: message.to_string(),
                    },
                }],
            ))
        }
        (state, event) => Err(FlowError::unexpected(state.name(), event.name())),
    }
}

/// Feeds the result of the help-request call back into the flow. Only a
/// form with a request in flight accepts it.
pub fn apply_outcome(state: &TriageState, outcome: HelpOutcome) -> Transition<TriageState> {
    if !matches!(state, TriageState::Form { submitting: true, .. }) {
        return Err(FlowError::unexpected(state.name(), "receive a counselor response"));
    }

    let retry = |message: &str| {
        (
            TriageState::Form {
                submitting: false,
                error: Some(message.to_string()),
            },
            vec![Effect::show_error(message)],
        )
    };

    Ok(match outcome {
        HelpOutcome::Accepted { after_hours } => {
            (TriageState::Confirmation { after_hours }, Vec::new())
        }
        HelpOutcome::Unauthorized => (
            TriageState::Closed,
            vec![Effect::show_error(LOGIN_REQUIRED), Effect::navigate(LOGIN_PATH)],
        ),
        HelpOutcome::Rejected { message } => {
            retry(message.as_deref().unwrap_or(GENERIC_FAILURE))
        }
        HelpOutcome::Unreachable => retry(CONNECTION_FAILURE),
    })
}
