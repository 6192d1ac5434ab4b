use crate::matrix::Quadrant;
use serde::{Deserialize, Serialize};

// Backend wire types.

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    #[default]
    None,
    TriggerHelpline,
    TriggerPanic,
}

impl ChatAction {
    /// Unknown or missing tags mean no action.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("trigger_helpline") => Self::TriggerHelpline,
            Some("trigger_panic") => Self::TriggerPanic,
            _ => Self::None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub action: Option<String>,
}

impl ChatReply {
    pub fn action(&self) -> ChatAction {
        ChatAction::parse(self.action.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub url: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct StressLogRequest<'a> {
    pub level: u8,
    pub source: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressHistoryEntry {
    pub date: String,
    pub level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Crisis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpRequest {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HelpAccepted {
    #[serde(default)]
    pub after_hours: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

// Local API payloads.

#[derive(Debug, Deserialize)]
pub struct TaskToggleRequest {
    pub completed: bool,
    pub points: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatSendRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct VoiceToggleRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct MatrixAddRequest {
    pub quadrant: Quadrant,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct MatrixMoveRequest {
    pub from: Quadrant,
    pub index: usize,
    pub to: Quadrant,
}

#[derive(Debug, Deserialize)]
pub struct MatrixDeleteRequest {
    pub quadrant: Quadrant,
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct SleepQuery {
    pub wake: String,
}

#[derive(Debug, Deserialize)]
pub struct ChunkRequest {
    pub task: String,
    pub days: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_reply_action_defaults_to_none() {
        let missing: ChatReply = serde_json::from_str(r#"{"response":"hi"}"#).unwrap();
        let null: ChatReply = serde_json::from_str(r#"{"response":"hi","action":null}"#).unwrap();
        let unknown: ChatReply =
            serde_json::from_str(r#"{"response":"hi","action":"trigger_confetti"}"#).unwrap();
        let panic: ChatReply =
            serde_json::from_str(r#"{"response":"breathe","action":"trigger_panic"}"#).unwrap();

        assert_eq!(missing.action(), ChatAction::None);
        assert_eq!(null.action(), ChatAction::None);
        assert_eq!(unknown.action(), ChatAction::None);
        assert_eq!(panic.action(), ChatAction::TriggerPanic);
    }

    #[test]
    fn resource_reads_type_field() {
        let resources: Vec<Resource> = serde_json::from_str(
            r##"[{"id":1,"title":"Sleep Hygiene 101","type":"audio","category":"Sleep","url":"#"}]"##,
        )
        .unwrap();
        assert_eq!(resources[0].kind, "audio");
        assert_eq!(resources[0].category, "Sleep");
    }
}
