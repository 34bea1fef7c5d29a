//! PostgreSQL implementation of PromptLog.
//!
//! Writes optimization, follow-up and explanation records to the tables
//! created by `migrations/0001_prompt_log.sql`.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::domain::feedback::PromptFeedback;
use crate::domain::foundation::RecordId;
use crate::ports::{FollowupRecord, OptimizationRecord, PersistenceError, PromptLog};

/// PostgreSQL implementation of PromptLog.
#[derive(Clone)]
pub struct PostgresPromptLog {
    pool: PgPool,
}

impl PostgresPromptLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending migrations.
    pub async fn migrate(&self) -> Result<(), PersistenceError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PersistenceError::database(format!("Failed to run migrations: {}", e)))
    }
}

#[async_trait]
impl PromptLog for PostgresPromptLog {
    async fn insert_optimization(
        &self,
        record: &OptimizationRecord,
    ) -> Result<RecordId, PersistenceError> {
        let (id,): (String,) = sqlx::query_as(
            r#"
            INSERT INTO optimized_prompts (
                original_prompt, optimized_prompt, mode, model_used, session_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id::text
            "#,
        )
        .bind(&record.original_prompt)
        .bind(&record.optimized_prompt)
        .bind(&record.mode)
        .bind(&record.model_used)
        .bind(record.session_id.as_uuid())
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PersistenceError::database(format!("Failed to insert optimization: {}", e)))?;

        RecordId::new(id).map_err(|e| PersistenceError::database(e.to_string()))
    }

    async fn insert_followup(&self, record: &FollowupRecord) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO deep_research_questions (
                prompt_id, questions_asked, answers, preferences
            ) VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.record_id.as_str())
        .bind(&record.questions_asked)
        .bind(&record.answers)
        .bind(&record.preferences)
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::database(format!("Failed to insert follow-up: {}", e)))?;

        Ok(())
    }

    async fn insert_explanation(
        &self,
        record_id: &RecordId,
        feedback: &PromptFeedback,
    ) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO prompt_explanations (prompt_id, explanation_json)
            VALUES ($1, $2)
            "#,
        )
        .bind(record_id.as_str())
        .bind(Json(feedback))
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::database(format!("Failed to insert explanation: {}", e)))?;

        Ok(())
    }
}
