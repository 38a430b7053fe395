use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::error;

use crate::db::StatusCheckRepository;
use crate::errors::AppError;
use crate::models::StatusCheck;

#[derive(Clone)]
pub struct PgStatusCheckRepository {
    pool: PgPool,
}

impl PgStatusCheckRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatusCheckRepository for PgStatusCheckRepository {
    async fn insert(&self, check: &StatusCheck) -> Result<(), AppError> {
        sqlx::query("INSERT INTO status_checks (id, client_name, created_at) VALUES ($1, $2, $3)")
            .bind(&check.id)
            .bind(&check.client_name)
            .bind(check.timestamp)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to save status check {}: {e}", check.id);
                AppError::db_query("Failed to save status check", e)
            })?;
        Ok(())
    }

    async fn find_all(&self, limit: i64) -> Result<Vec<StatusCheck>, AppError> {
        let rows = sqlx::query(
            "SELECT id, client_name, created_at FROM status_checks
             ORDER BY created_at ASC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to fetch status checks: {e}");
            AppError::db_query("Failed to fetch status checks", e)
        })?;

        rows.into_iter()
            .map(|row| -> Result<StatusCheck, AppError> {
                Ok(StatusCheck {
                    id: row.try_get("id").map_err(|e| AppError::db_query("Failed to read id", e))?,
                    client_name: row
                        .try_get("client_name")
                        .map_err(|e| AppError::db_query("Failed to read client_name", e))?,
                    timestamp: row
                        .try_get("created_at")
                        .map_err(|e| AppError::db_query("Failed to read created_at", e))?,
                })
            })
            .collect()
    }
}
