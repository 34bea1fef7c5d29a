//! HTTP adapters - REST API implementations.
//!
//! The chat endpoints stand in for a chat platform webhook: every request is
//! one inbound event and the response carries the assistant's replies.

pub mod chat;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use chat::{chat_router, ChatAppState};

/// Full application router: chat API, health probe and request tracing.
pub fn app_router(state: ChatAppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(chat_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
