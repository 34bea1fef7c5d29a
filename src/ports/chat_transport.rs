//! Chat Transport Port - Interface for replying to the user.
//!
//! The dialogue engine is transport agnostic: a chat-platform webhook, the
//! HTTP chat API or a test double all implement [`ChatTransport`]. Inbound
//! turns reach the engine as plain method calls; this port covers the
//! outbound direction only.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::SessionId;

/// How the receiving client should render a text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    #[default]
    Plain,
    /// Platform Markdown (`*bold*`).
    Markdown,
}

/// Errors that can occur while sending to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// A single send failed; later sends may still succeed.
    #[error("Failed to send message: {0}")]
    SendFailed(String),

    /// The chat is gone (blocked bot, deleted chat). Nothing more can be sent.
    #[error("Chat unavailable: {0}")]
    ChatUnavailable(String),
}

impl TransportError {
    pub fn send_failed(reason: impl Into<String>) -> Self {
        Self::SendFailed(reason.into())
    }

    pub fn chat_unavailable(reason: impl Into<String>) -> Self {
        Self::ChatUnavailable(reason.into())
    }

    /// Returns true if the conversation cannot continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransportError::ChatUnavailable(_))
    }
}

/// Port for delivering messages to one user's chat.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends a text message.
    async fn send_text(
        &self,
        session_id: SessionId,
        text: &str,
        format: TextFormat,
    ) -> Result<(), TransportError>;

    /// Sends a file attachment.
    async fn send_file(
        &self,
        session_id: SessionId,
        content: &[u8],
        filename: &str,
    ) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_chat_unavailable_is_fatal() {
        assert!(TransportError::chat_unavailable("blocked").is_fatal());
        assert!(!TransportError::send_failed("429").is_fatal());
    }

    #[test]
    fn text_format_defaults_to_plain() {
        assert_eq!(TextFormat::default(), TextFormat::Plain);
        assert_eq!(serde_json::to_string(&TextFormat::Markdown).unwrap(), "\"markdown\"");
    }
}
