//! HTTP adapter for chat endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ChatStateView, ChatTurnResponse, ErrorResponse, OutboundMessage, SendMessageRequest};
pub use handlers::{ChatApiError, ChatAppState, CollectingTransport};
pub use routes::{chat_router, chat_routes};
