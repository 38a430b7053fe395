use std::sync::Arc;

use tracing::{debug, info};

use crate::db::SessionRepository;
use crate::errors::AppError;
use crate::models::{self, ChatMessage, ChatSession, NewChatMessage, DEFAULT_SESSION_TITLE};

const MAX_SESSIONS_PER_LIST: i64 = 100;

/// Chat session lifecycle. Holds no session state of its own; every call
/// goes to the repository.
#[derive(Clone)]
pub struct SessionService {
    repo: Arc<dyn SessionRepository>,
}

impl SessionService {
    pub fn new(repo: Arc<dyn SessionRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_session(
        &self,
        user_id: &str,
        task: &str,
        title: Option<&str>,
    ) -> Result<ChatSession, AppError> {
        if user_id.trim().is_empty() {
            return Err(AppError::EmptyField { field_name: "userId".to_string() });
        }
        if task.trim().is_empty() {
            return Err(AppError::EmptyField { field_name: "task".to_string() });
        }

        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_SESSION_TITLE);

        let session = ChatSession::new(user_id.to_string(), task.to_string(), title.to_string());
        self.repo.insert(&session).await?;
        info!(id = %session.id, user = %user_id, task = %task, "Chat session created");
        Ok(session)
    }

    pub async fn list_sessions(&self, user_id: &str, task: &str) -> Result<Vec<ChatSession>, AppError> {
        self.repo
            .find_by_user_and_task(user_id, task, MAX_SESSIONS_PER_LIST)
            .await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<ChatSession, AppError> {
        match self.repo.find_by_id(session_id).await? {
            Some(session) => Ok(session),
            None => {
                debug!(session = %session_id, "Session not found");
                Err(AppError::SessionNotFound { id: session_id.to_string() })
            }
        }
    }

    pub async fn append_message(
        &self,
        session_id: &str,
        message: NewChatMessage,
    ) -> Result<ChatMessage, AppError> {
        let message = ChatMessage::from(message);
        let appended = self.repo.push_message(session_id, &message, models::now()).await?;
        if !appended {
            debug!(session = %session_id, message = %message.id, "Append to unknown session");
            return Err(AppError::SessionNotFound { id: session_id.to_string() });
        }

        debug!(session = %session_id, message = %message.id, kind = %message.kind, "Message appended");
        Ok(message)
    }
}
