use crate::escalation::EscalationSignal;
use crate::flow::{Effect, FlowError};
use crate::models::{ChatAction, ChatReply};
use serde::Serialize;

pub const CONNECTION_TROUBLE: &str = "Sorry, I'm having trouble connecting right now.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatState {
    pub transcript: Vec<ChatMessage>,
    pub voice_enabled: bool,
}

impl ChatState {
    pub fn new(username: &str) -> Self {
        Self {
            transcript: vec![greeting(username)],
            voice_enabled: false,
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.transcript.push(message);
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
    }
}

pub fn greeting(username: &str) -> ChatMessage {
    ChatMessage::bot(format!(
        "Hi {username}! I'm Willow, your wellness companion. How are you feeling today? 🌿"
    ))
}

pub fn validate_message(raw: &str) -> Result<&str, FlowError> {
    let message = raw.trim();
    if message.is_empty() {
        return Err(FlowError::invalid("message cannot be empty"));
    }
    Ok(message)
}

/// Turns a bot reply into effects, in order: transcript line, at most one
/// escalation, then speech when voice output is on.
pub fn route_reply(reply: &ChatReply, voice_enabled: bool) -> Vec<Effect> {
    let mut effects = vec![Effect::AppendTranscript {
        message: ChatMessage::bot(reply.response.clone()),
    }];

    let signal = match reply.action() {
        ChatAction::TriggerHelpline => Some(EscalationSignal::CrisisBanner),
        ChatAction::TriggerPanic => Some(EscalationSignal::PanicOverlay),
        ChatAction::None => None,
    };
    if let Some(signal) = signal {
        effects.push(Effect::Escalate { signal });
    }

    if voice_enabled && !reply.response.trim().is_empty() {
        effects.push(Effect::Speak {
            text: reply.response.clone(),
        });
    }

    effects
}

pub fn connection_failure() -> Vec<Effect> {
    vec![Effect::AppendTranscript {
        message: ChatMessage::bot(CONNECTION_TROUBLE),
    }]
}
