//! In-process store used by `STORAGE_BACKEND=memory` and by the test suite.
//! Every mutation happens under a single write lock, which gives the same
//! per-document atomicity the PostgreSQL repositories get from single
//! statements.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::db::{GenerationRepository, SessionRepository, StatusCheckRepository};
use crate::errors::AppError;
use crate::models::{ChatMessage, ChatSession, GenerationRecord, StatusCheck};

#[derive(Default)]
pub struct MemoryStatusCheckRepository {
    records: RwLock<Vec<StatusCheck>>,
}

#[async_trait]
impl StatusCheckRepository for MemoryStatusCheckRepository {
    async fn insert(&self, check: &StatusCheck) -> Result<(), AppError> {
        self.records.write().await.push(check.clone());
        Ok(())
    }

    async fn find_all(&self, limit: i64) -> Result<Vec<StatusCheck>, AppError> {
        let records = self.records.read().await;
        Ok(records.iter().take(clamp_limit(limit)).cloned().collect())
    }
}

#[derive(Default)]
pub struct MemoryGenerationRepository {
    records: RwLock<Vec<GenerationRecord>>,
}

#[cfg(test)]
impl MemoryGenerationRepository {
    pub async fn all(&self) -> Vec<GenerationRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl GenerationRepository for MemoryGenerationRepository {
    async fn insert(&self, record: &GenerationRecord) -> Result<(), AppError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySessionRepository {
    sessions: RwLock<HashMap<String, ChatSession>>,
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn insert(&self, session: &ChatSession) -> Result<(), AppError> {
        self.sessions.write().await.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ChatSession>, AppError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn find_by_user_and_task(
        &self,
        user_id: &str,
        task: &str,
        limit: i64,
    ) -> Result<Vec<ChatSession>, AppError> {
        let sessions = self.sessions.read().await;
        let mut matching: Vec<ChatSession> = sessions
            .values()
            .filter(|s| s.user_id == user_id && s.task == task)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        matching.truncate(clamp_limit(limit));
        Ok(matching)
    }

    async fn push_message(
        &self,
        id: &str,
        message: &ChatMessage,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) => {
                session.messages.push(message.clone());
                session.updated_at = session.updated_at.max(updated_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn clamp_limit(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}
