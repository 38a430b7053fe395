use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

use crate::db::GenerationRepository;
use crate::errors::AppError;
use crate::models::GenerationRecord;

/// Append-only log of generation requests.
#[derive(Clone)]
pub struct PgGenerationRepository {
    pool: PgPool,
}

impl PgGenerationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenerationRepository for PgGenerationRepository {
    async fn insert(&self, record: &GenerationRecord) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO generations (id, user_id, task, prompt, amendment_prompt, response, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.task)
        .bind(&record.prompt)
        .bind(record.amendment_prompt.as_deref())
        .bind(&record.response)
        .bind(record.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to save generation {} for user {}: {e}", record.id, record.user_id);
            AppError::db_query("Failed to save generation", e)
        })?;
        Ok(())
    }
}
