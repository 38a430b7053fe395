use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::error;

use crate::db::SessionRepository;
use crate::errors::AppError;
use crate::models::{ChatMessage, ChatSession};

#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape of `chat_sessions`; the transcript lives in a JSONB array.
struct ChatSessionRow {
    id: String,
    user_id: String,
    task: String,
    title: String,
    messages: Json<Vec<ChatMessage>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChatSessionRow {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            task: row.try_get("task")?,
            title: row.try_get("title")?,
            messages: row.try_get("messages")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_session(self) -> ChatSession {
        ChatSession {
            id: self.id,
            user_id: self.user_id,
            task: self.task,
            title: self.title,
            messages: self.messages.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn decode(row: &PgRow) -> Result<ChatSession, AppError> {
    ChatSessionRow::from_row(row)
        .map(ChatSessionRow::into_session)
        .map_err(|e| {
            error!("Failed to decode chat session row: {e}");
            AppError::CorruptRecord { message: e.to_string() }
        })
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn insert(&self, session: &ChatSession) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO chat_sessions (id, user_id, task, title, messages, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(&session.task)
        .bind(&session.title)
        .bind(Json(&session.messages))
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to save chat session {}: {e}", session.id);
            AppError::db_query("Failed to save chat session", e)
        })?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ChatSession>, AppError> {
        let row = sqlx::query(
            "SELECT id, user_id, task, title, messages, created_at, updated_at
             FROM chat_sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to find chat session {id}: {e}");
            AppError::db_query(format!("Failed to find chat session {id}"), e)
        })?;

        row.as_ref().map(decode).transpose()
    }

    async fn find_by_user_and_task(
        &self,
        user_id: &str,
        task: &str,
        limit: i64,
    ) -> Result<Vec<ChatSession>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, task, title, messages, created_at, updated_at
             FROM chat_sessions
             WHERE user_id = $1 AND task = $2
             ORDER BY updated_at DESC
             LIMIT $3",
        )
        .bind(user_id)
        .bind(task)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to fetch chat sessions for user {user_id}, task {task}: {e}");
            AppError::db_query("Failed to fetch chat sessions", e)
        })?;

        rows.iter().map(decode).collect()
    }

    async fn push_message(
        &self,
        id: &str,
        message: &ChatMessage,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        // Single statement: concurrent appends serialize on the row lock.
        let result = sqlx::query(
            "UPDATE chat_sessions
             SET messages = messages || jsonb_build_array($1::jsonb),
                 updated_at = GREATEST(updated_at, $2)
             WHERE id = $3",
        )
        .bind(Json(message))
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to append message {} to chat session {id}: {e}", message.id);
            AppError::db_query("Failed to append message", e)
        })?;

        Ok(result.rows_affected() > 0)
    }
}
