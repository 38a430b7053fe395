use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Top-level application error.
/// All variants carry a human-readable message for display/logging.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Database errors ──────────────────────────────────────────────────────
    #[error("Database connection failed: {0}")]
    DatabaseConnectionFailed(#[source] sqlx::Error),

    #[error("Database migration failed: {0}")]
    DatabaseMigrationFailed(#[source] sqlx::migrate::MigrateError),

    #[error("Database query failed: {message}")]
    DatabaseQueryFailed {
        message: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Stored record is corrupt: {message}")]
    CorruptRecord { message: String },

    // ── Validation errors ────────────────────────────────────────────────────
    #[error("Field '{field_name}' cannot be empty")]
    EmptyField { field_name: String },

    #[error("Field '{field_name}' is required")]
    MissingField { field_name: String },

    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    // ── Session errors ───────────────────────────────────────────────────────
    #[error("Session not found")]
    SessionNotFound { id: String },

    // ── Configuration errors ─────────────────────────────────────────────────
    #[error("Configuration '{key}' must be set")]
    MissingConfig { key: String },

    #[error("Configuration '{key}' has invalid value '{value}'")]
    InvalidConfig { key: String, value: String },

    // ── System errors ────────────────────────────────────────────────────────
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn db_query(message: impl Into<String>, source: sqlx::Error) -> Self {
        AppError::DatabaseQueryFailed { message: message.into(), source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::SessionNotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::EmptyField { .. } | AppError::MissingField { .. } | AppError::InvalidBody { .. }
        )
    }

    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            AppError::DatabaseConnectionFailed(_)
                | AppError::DatabaseMigrationFailed(_)
                | AppError::DatabaseQueryFailed { .. }
                | AppError::CorruptRecord { .. }
        )
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_validation() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Client errors echo their message; server errors are logged here and
/// answered with a generic body.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = if status.is_server_error() {
            let source = std::error::Error::source(&self);
            if self.is_persistence() {
                error!(error = %self, ?source, "Persistence failure");
            } else {
                error!(error = %self, ?source, "Unexpected failure");
            }
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
