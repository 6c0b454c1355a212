//! HTTP DTOs for the triage chat endpoint
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::domain::triage::{Role, Stage, Transcript, TriageReply};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Speaker tag on a history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakerDto {
    User,
    /// The chat page tags its own turns `ai`.
    #[serde(alias = "ai")]
    Assistant,
}

impl From<SpeakerDto> for Role {
    fn from(speaker: SpeakerDto) -> Self {
        match speaker {
            SpeakerDto::User => Role::User,
            SpeakerDto::Assistant => Role::Assistant,
        }
    }
}

/// One prior message as the client stores it.
///
/// Older clients tag the speaker with `type` instead of `role`. A missing or
/// null `content` reads as blank, so the record is dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryRecord {
    #[serde(alias = "type")]
    pub role: SpeakerDto,
    #[serde(default)]
    pub content: Option<String>,
}

/// Request to answer one chat turn.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Checked by the application layer so that a missing and a blank
    /// message produce the same validation error.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryRecord>,
}

impl ChatRequest {
    /// Converts the history into a transcript, dropping blank records.
    pub fn transcript(&self) -> Transcript {
        Transcript::from_records(
            self.conversation_history
                .iter()
                .map(|record| {
                    let content = record.content.as_deref().unwrap_or_default();
                    (Role::from(record.role), content)
                }),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for a chat turn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub is_emergency: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_retry: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_mock: Option<bool>,
}

impl From<TriageReply> for ChatResponse {
    fn from(reply: TriageReply) -> Self {
        let is_emergency = reply.is_emergency();
        let is_retry = reply.is_retry().then_some(true);
        let is_mock = reply.is_mock().then_some(true);
        Self {
            response: reply.text,
            is_emergency,
            stage: reply.stage,
            is_retry,
            is_mock,
        }
    }
}

/// Liveness probe body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Standard error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            code: "CONFIGURATION_ERROR".to_string(),
            message: message.into(),
        }
    }

    pub fn generation_failed(message: impl Into<String>) -> Self {
        Self {
            code: "GENERATION_FAILED".to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::triage::ReplySource;

    #[test]
    fn test_chat_request_deserialization() {
        let json = r#"{
            "message": "머리가 아파요",
            "conversationHistory": [
                {"role": "user", "content": "안녕하세요"},
                {"role": "assistant", "content": "어디가 불편하신가요?"}
            ]
        }"#;
        let req: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.message.as_deref(), Some("머리가 아파요"));
        assert_eq!(req.conversation_history.len(), 2);
        assert_eq!(req.transcript().user_turns(), 1);
    }

    #[test]
    fn test_history_defaults_to_empty() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert!(req.conversation_history.is_empty());
        assert!(req.transcript().is_empty());
    }

    #[test]
    fn test_missing_message_is_none() {
        let req: ChatRequest = serde_json::from_str(r#"{"conversationHistory": []}"#).unwrap();
        assert!(req.message.is_none());
    }

    #[test]
    fn test_legacy_type_key_accepted() {
        let json = r#"{"message": "x", "conversationHistory": [{"type": "user", "content": "두통"}]}"#;
        let req: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.conversation_history[0].role, SpeakerDto::User);
    }

    #[test]
    fn test_ai_speaker_tag_is_assistant() {
        let json = r#"{"message": "x", "conversationHistory": [
            {"type": "ai", "content": "안녕하세요! 어떤 증상으로 오셨나요?"},
            {"type": "user", "content": "두통"}
        ]}"#;
        let req: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.conversation_history[0].role, SpeakerDto::Assistant);

        let transcript = req.transcript();
        assert_eq!(transcript.messages()[0].role(), Role::Assistant);
        assert_eq!(transcript.user_turns(), 1);
    }

    #[test]
    fn test_unknown_speaker_rejected() {
        let json = r#"{"message": "x", "conversationHistory": [{"role": "system", "content": "hi"}]}"#;
        assert!(serde_json::from_str::<ChatRequest>(json).is_err());
    }

    #[test]
    fn test_blank_history_records_dropped() {
        let json = r#"{"message": "x", "conversationHistory": [
            {"role": "user", "content": "  "},
            {"role": "assistant"},
            {"role": "assistant", "content": null},
            {"role": "user", "content": "배가 아파요"}
        ]}"#;
        let req: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.transcript().len(), 1);
    }

    #[test]
    fn test_emergency_response_omits_optional_fields() {
        let json = serde_json::to_value(ChatResponse::from(TriageReply::emergency())).unwrap();
        assert_eq!(json["isEmergency"], true);
        assert!(json.get("stage").is_none());
        assert!(json.get("isRetry").is_none());
        assert!(json.get("isMock").is_none());
    }

    #[test]
    fn test_retry_response_serialization() {
        let reply = TriageReply::generated("답변", Stage::SymptomCollection, ReplySource::Retry);
        let json = serde_json::to_value(ChatResponse::from(reply)).unwrap();
        assert_eq!(json["response"], "답변");
        assert_eq!(json["isEmergency"], false);
        assert_eq!(json["stage"], "symptom_collection");
        assert_eq!(json["isRetry"], true);
        assert!(json.get("isMock").is_none());
    }

    #[test]
    fn test_error_response_serialization() {
        let json = serde_json::to_value(ErrorResponse::bad_request("message required")).unwrap();
        assert_eq!(json["code"], "BAD_REQUEST");
        assert_eq!(json["message"], "message required");
    }
}
