//! Axum routes for chat endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{cancel_chat, get_chat, send_message, start_chat, ChatAppState};

/// Creates routes for chat endpoints.
///
/// - POST /chats/:session_id/start - Start or restart a conversation
/// - POST /chats/:session_id/messages - Send one user turn
/// - POST /chats/:session_id/cancel - Cancel the conversation
/// - GET /chats/:session_id - Current state
pub fn chat_routes() -> Router<ChatAppState> {
    Router::new()
        .route("/chats/:session_id", get(get_chat))
        .route("/chats/:session_id/start", post(start_chat))
        .route("/chats/:session_id/messages", post(send_message))
        .route("/chats/:session_id/cancel", post(cancel_chat))
}

/// Combined router with all chat routes under /api.
pub fn chat_router() -> Router<ChatAppState> {
    Router::new().nest("/api", chat_routes())
}
