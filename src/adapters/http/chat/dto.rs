//! HTTP DTOs for chat endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::domain::dialogue::DialogueState;
use crate::ports::TextFormat;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/chats/:session_id/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// One message the assistant sent during a request, in send order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundMessage {
    Text { text: String, format: TextFormat },
    File { filename: String, content: String },
}

/// Result of a start, message or cancel request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnResponse {
    pub session_id: String,
    /// State after the event was handled.
    pub state: DialogueState,
    /// False once the conversation has finished or been cancelled.
    pub active: bool,
    pub messages: Vec<OutboundMessage>,
}

impl ChatTurnResponse {
    pub fn new(session_id: impl Into<String>, state: DialogueState, messages: Vec<OutboundMessage>) -> Self {
        Self {
            session_id: session_id.into(),
            state,
            active: state.is_active(),
            messages,
        }
    }
}

/// Result of `GET /api/chats/:session_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStateView {
    pub session_id: String,
    pub state: DialogueState,
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
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

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} not found: {}", resource_type, id),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_GATEWAY".to_string(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_messages_are_tagged_by_kind() {
        let text = OutboundMessage::Text {
            text: "hi".to_string(),
            format: TextFormat::Markdown,
        };
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["format"], "markdown");

        let file = OutboundMessage::File {
            filename: "response.txt".to_string(),
            content: "long".to_string(),
        };
        assert_eq!(serde_json::to_value(&file).unwrap()["kind"], "file");
    }

    #[test]
    fn turn_response_reports_activity_from_state() {
        let response = ChatTurnResponse::new("id", DialogueState::Done, vec![]);
        assert!(!response.active);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["sessionId"], "id");
        assert_eq!(json["state"], "done");
    }

    #[test]
    fn error_response_not_found_formats_message() {
        let error = ErrorResponse::not_found("Conversation", "abc");
        assert_eq!(error.code, "NOT_FOUND");
        assert_eq!(error.message, "Conversation not found: abc");
    }
}
