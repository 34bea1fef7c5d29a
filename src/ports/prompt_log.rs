//! Prompt Log Port - Interface for recording optimization results.
//!
//! Records feed later analytics. Writes are best effort: callers log a
//! [`PersistenceError`] and carry on, they never abort a conversation on it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::feedback::PromptFeedback;
use crate::domain::foundation::{RecordId, SessionId};

/// Errors that can occur while writing records.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Failed to serialize record: {0}")]
    Serialization(String),
}

impl PersistenceError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }
}

/// One completed optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRecord {
    pub original_prompt: String,
    pub optimized_prompt: String,
    pub mode: String,
    /// Model that produced the rewrite.
    pub model_used: String,
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
}

/// Answers generated in the deep-research follow-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowupRecord {
    /// Optimization this follow-up belongs to; may be the unrecorded sentinel.
    pub record_id: RecordId,
    pub questions_asked: String,
    pub answers: String,
    /// Empty when the user declined to give preferences.
    pub preferences: String,
}

/// Port for persisting prompt optimization records.
#[async_trait]
pub trait PromptLog: Send + Sync {
    /// Records an optimization and returns its identifier.
    async fn insert_optimization(
        &self,
        record: &OptimizationRecord,
    ) -> Result<RecordId, PersistenceError>;

    /// Records follow-up answers keyed by the optimization's identifier.
    async fn insert_followup(&self, record: &FollowupRecord) -> Result<(), PersistenceError>;

    /// Records the explanation of an optimization.
    async fn insert_explanation(
        &self,
        record_id: &RecordId,
        feedback: &PromptFeedback,
    ) -> Result<(), PersistenceError>;
}
