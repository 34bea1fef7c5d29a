//! HTTP handlers for chat endpoints.
//!
//! Each request is one inbound chat event. Replies the engine sends while
//! handling it are collected and returned in the response body, so the HTTP
//! client plays the part of the chat platform.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tokio::sync::Mutex;

use crate::application::handlers::{DialogueEngine, DialogueError};
use crate::domain::foundation::SessionId;
use crate::ports::{ChatTransport, TextFormat, TransportError};

use super::dto::{ChatStateView, ChatTurnResponse, ErrorResponse, OutboundMessage, SendMessageRequest};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state for chat handlers.
#[derive(Clone)]
pub struct ChatAppState {
    pub engine: Arc<DialogueEngine>,
}

impl ChatAppState {
    pub fn new(engine: Arc<DialogueEngine>) -> Self {
        Self { engine }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Collecting Transport
// ════════════════════════════════════════════════════════════════════════════════

/// Chat transport that buffers everything sent during one request.
#[derive(Debug, Default)]
pub struct CollectingTransport {
    messages: Mutex<Vec<OutboundMessage>>,
}

impl CollectingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_messages(self) -> Vec<OutboundMessage> {
        self.messages.into_inner()
    }
}

#[async_trait]
impl ChatTransport for CollectingTransport {
    async fn send_text(
        &self,
        _session_id: SessionId,
        text: &str,
        format: TextFormat,
    ) -> Result<(), TransportError> {
        self.messages.lock().await.push(OutboundMessage::Text {
            text: text.to_string(),
            format,
        });
        Ok(())
    }

    async fn send_file(
        &self,
        _session_id: SessionId,
        content: &[u8],
        filename: &str,
    ) -> Result<(), TransportError> {
        let content = String::from_utf8(content.to_vec())
            .map_err(|e| TransportError::send_failed(format!("attachment is not UTF-8: {}", e)))?;
        self.messages.lock().await.push(OutboundMessage::File {
            filename: filename.to_string(),
            content,
        });
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/chats/:session_id/start - Start or restart a conversation.
pub async fn start_chat(
    State(state): State<ChatAppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ChatApiError> {
    let id = parse_session_id(&session_id)?;
    let transport = CollectingTransport::new();

    let next = state.engine.start(id, &transport).await?;

    let body = ChatTurnResponse::new(id.to_string(), next, transport.into_messages());
    Ok((StatusCode::OK, Json(body)))
}

/// POST /api/chats/:session_id/messages - Send one user turn.
///
/// # Errors
/// - 400 Bad Request: invalid session id or blank text
/// - 404 Not Found: no active conversation
pub async fn send_message(
    State(state): State<ChatAppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ChatApiError> {
    let id = parse_session_id(&session_id)?;
    if request.text.trim().is_empty() {
        return Err(ChatApiError::BadRequest("Message text must not be empty".to_string()));
    }
    let transport = CollectingTransport::new();

    let next = state.engine.handle_turn(id, &request.text, &transport).await?;

    let body = ChatTurnResponse::new(id.to_string(), next, transport.into_messages());
    Ok((StatusCode::OK, Json(body)))
}

/// POST /api/chats/:session_id/cancel - Cancel the conversation.
pub async fn cancel_chat(
    State(state): State<ChatAppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ChatApiError> {
    let id = parse_session_id(&session_id)?;
    let transport = CollectingTransport::new();

    let next = state.engine.cancel(id, &transport).await?;

    let body = ChatTurnResponse::new(id.to_string(), next, transport.into_messages());
    Ok((StatusCode::OK, Json(body)))
}

/// GET /api/chats/:session_id - Current state of an active conversation.
pub async fn get_chat(
    State(state): State<ChatAppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ChatApiError> {
    let id = parse_session_id(&session_id)?;

    let current = state
        .engine
        .state_of(id)
        .await
        .ok_or_else(|| ChatApiError::NotFound(id.to_string()))?;

    Ok((
        StatusCode::OK,
        Json(ChatStateView {
            session_id: id.to_string(),
            state: current,
        }),
    ))
}

fn parse_session_id(raw: &str) -> Result<SessionId, ChatApiError> {
    raw.parse()
        .map_err(|_| ChatApiError::BadRequest("Invalid session ID format".to_string()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type for chat endpoints.
#[derive(Debug)]
pub enum ChatApiError {
    BadRequest(String),
    NotFound(String),
    Transport(String),
    Internal(String),
}

impl From<DialogueError> for ChatApiError {
    fn from(error: DialogueError) -> Self {
        match error {
            DialogueError::NoActiveSession(id) => ChatApiError::NotFound(id.to_string()),
            DialogueError::Transport(e) => ChatApiError::Transport(e.to_string()),
            other => ChatApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ChatApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg)),
            ChatApiError::NotFound(id) => {
                (StatusCode::NOT_FOUND, ErrorResponse::not_found("Conversation", &id))
            }
            ChatApiError::Transport(msg) => {
                tracing::warn!("Chat transport error: {}", msg);
                (StatusCode::BAD_GATEWAY, ErrorResponse::bad_gateway(msg))
            }
            ChatApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal("An internal error occurred"),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collecting_transport_keeps_send_order() {
        let transport = CollectingTransport::new();
        let id = SessionId::new();

        transport.send_text(id, "first", TextFormat::Plain).await.unwrap();
        transport.send_file(id, b"body", "response.txt").await.unwrap();
        transport.send_text(id, "*third*", TextFormat::Markdown).await.unwrap();

        let messages = transport.into_messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages[1],
            OutboundMessage::File {
                filename: "response.txt".to_string(),
                content: "body".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn non_utf8_attachment_is_a_send_failure() {
        let transport = CollectingTransport::new();
        let result = transport.send_file(SessionId::new(), &[0xff, 0xfe], "x.txt").await;
        assert!(matches!(result, Err(TransportError::SendFailed(_))));
    }

    #[test]
    fn no_active_session_maps_to_not_found() {
        let error: ChatApiError = DialogueError::NoActiveSession(SessionId::new()).into();
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn transport_failure_maps_to_bad_gateway() {
        let error: ChatApiError =
            DialogueError::Transport(TransportError::chat_unavailable("gone")).into();
        assert_eq!(error.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn invalid_session_id_is_bad_request() {
        assert!(matches!(
            parse_session_id("not-a-uuid"),
            Err(ChatApiError::BadRequest(_))
        ));
    }
}
