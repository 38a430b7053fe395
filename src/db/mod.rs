//! Persistence layer.
//!
//! Each collection sits behind its own repository trait so the services can
//! run against PostgreSQL in production and the in-memory store in tests or
//! local development. [`Store`] bundles one handle per collection and owns
//! the underlying connection pool, which must be released with
//! [`Store::close`] at shutdown.

pub mod generation_repository;
pub mod memory;
pub mod session_repository;
pub mod status_repository;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::StorageBackend;
use crate::errors::AppError;
use crate::models::{ChatMessage, ChatSession, GenerationRecord, StatusCheck};

use self::generation_repository::PgGenerationRepository;
use self::memory::{MemoryGenerationRepository, MemorySessionRepository, MemoryStatusCheckRepository};
use self::session_repository::PgSessionRepository;
use self::status_repository::PgStatusCheckRepository;

#[async_trait]
pub trait StatusCheckRepository: Send + Sync {
    async fn insert(&self, check: &StatusCheck) -> Result<(), AppError>;

    /// Oldest first, at most `limit` records.
    async fn find_all(&self, limit: i64) -> Result<Vec<StatusCheck>, AppError>;
}

#[async_trait]
pub trait GenerationRepository: Send + Sync {
    async fn insert(&self, record: &GenerationRecord) -> Result<(), AppError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert(&self, session: &ChatSession) -> Result<(), AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<ChatSession>, AppError>;

    /// Sessions for exactly this (user, task) pair, most recently updated first.
    async fn find_by_user_and_task(
        &self,
        user_id: &str,
        task: &str,
        limit: i64,
    ) -> Result<Vec<ChatSession>, AppError>;

    /// Appends `message` and bumps `updated_at` in one atomic update.
    /// `updated_at` never moves backwards. Returns `false` when no session
    /// has that id.
    async fn push_message(
        &self,
        id: &str,
        message: &ChatMessage,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct Store {
    pub status_checks: Arc<dyn StatusCheckRepository>,
    pub generations: Arc<dyn GenerationRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pool: Option<PgPool>,
}

impl Store {
    pub async fn connect(backend: &StorageBackend) -> Result<Self, AppError> {
        match backend {
            StorageBackend::Postgres { database_url, max_connections } => {
                let pool = PgPoolOptions::new()
                    .max_connections(*max_connections)
                    .connect(database_url)
                    .await
                    .map_err(AppError::DatabaseConnectionFailed)?;

                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .map_err(AppError::DatabaseMigrationFailed)?;

                info!("Database connection established and schema applied");
                Ok(Self::postgres(pool))
            }
            StorageBackend::Memory => {
                info!("Using in-memory store; data is lost on shutdown");
                Ok(Self::memory())
            }
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            status_checks: Arc::new(PgStatusCheckRepository::new(pool.clone())),
            generations: Arc::new(PgGenerationRepository::new(pool.clone())),
            sessions: Arc::new(PgSessionRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    pub fn memory() -> Self {
        Self {
            status_checks: Arc::new(MemoryStatusCheckRepository::default()),
            generations: Arc::new(MemoryGenerationRepository::default()),
            sessions: Arc::new(MemorySessionRepository::default()),
            pool: None,
        }
    }

    pub async fn close(self) {
        if let Some(pool) = self.pool {
            pool.close().await;
            info!("Database pool closed");
        }
    }
}

/// Pool for the PostgreSQL-backed tests, with the schema applied. These tests
/// are `#[ignore]`d; run them with `TEST_DATABASE_URL` set and `--ignored`.
#[cfg(test)]
pub(crate) async fn test_pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("apply migrations");
    pool
}
