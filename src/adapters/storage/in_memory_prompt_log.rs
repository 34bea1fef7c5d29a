//! In-Memory Prompt Log Adapter
//!
//! Keeps prompt records in memory. Used by tests and when running without a
//! database for local development.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::feedback::PromptFeedback;
use crate::domain::foundation::RecordId;
use crate::ports::{FollowupRecord, OptimizationRecord, PersistenceError, PromptLog};

/// In-memory prompt log
#[derive(Debug, Clone, Default)]
pub struct InMemoryPromptLog {
    optimizations: Arc<RwLock<Vec<(RecordId, OptimizationRecord)>>>,
    followups: Arc<RwLock<Vec<FollowupRecord>>>,
    explanations: Arc<RwLock<Vec<(RecordId, PromptFeedback)>>>,
    failing: Arc<AtomicBool>,
    failing_optimizations: Arc<AtomicBool>,
}

impl InMemoryPromptLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail, simulating an unreachable database.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes only `insert_optimization` fail; follow-up and explanation
    /// writes still succeed.
    pub fn set_optimizations_failing(&self, failing: bool) {
        self.failing_optimizations.store(failing, Ordering::SeqCst);
    }

    pub async fn optimizations(&self) -> Vec<(RecordId, OptimizationRecord)> {
        self.optimizations.read().await.clone()
    }

    pub async fn followups(&self) -> Vec<FollowupRecord> {
        self.followups.read().await.clone()
    }

    pub async fn explanations(&self) -> Vec<(RecordId, PromptFeedback)> {
        self.explanations.read().await.clone()
    }

    /// Clear all stored records (useful for tests)
    pub async fn clear(&self) {
        self.optimizations.write().await.clear();
        self.followups.write().await.clear();
        self.explanations.write().await.clear();
    }

    fn check_available(&self) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::database("in-memory log is set to fail"));
        }
        Ok(())
    }
}

#[async_trait]
impl PromptLog for InMemoryPromptLog {
    async fn insert_optimization(
        &self,
        record: &OptimizationRecord,
    ) -> Result<RecordId, PersistenceError> {
        self.check_available()?;
        if self.failing_optimizations.load(Ordering::SeqCst) {
            return Err(PersistenceError::database("optimization table unavailable"));
        }
        let id = RecordId::generate();
        self.optimizations
            .write()
            .await
            .push((id.clone(), record.clone()));
        Ok(id)
    }

    async fn insert_followup(&self, record: &FollowupRecord) -> Result<(), PersistenceError> {
        self.check_available()?;
        self.followups.write().await.push(record.clone());
        Ok(())
    }

    async fn insert_explanation(
        &self,
        record_id: &RecordId,
        feedback: &PromptFeedback,
    ) -> Result<(), PersistenceError> {
        self.check_available()?;
        self.explanations
            .write()
            .await
            .push((record_id.clone(), feedback.clone()));
        Ok(())
    }
}
