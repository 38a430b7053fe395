use std::sync::Arc;

use tracing::info;

use crate::db::StatusCheckRepository;
use crate::errors::AppError;
use crate::models::StatusCheck;

const MAX_STATUS_CHECKS: i64 = 1000;

#[derive(Clone)]
pub struct StatusService {
    repo: Arc<dyn StatusCheckRepository>,
}

impl StatusService {
    pub fn new(repo: Arc<dyn StatusCheckRepository>) -> Self {
        Self { repo }
    }

    pub async fn record(&self, client_name: String) -> Result<StatusCheck, AppError> {
        let check = StatusCheck::new(client_name);
        self.repo.insert(&check).await?;
        info!(id = %check.id, client = %check.client_name, "Status check recorded");
        Ok(check)
    }

    pub async fn list(&self) -> Result<Vec<StatusCheck>, AppError> {
        self.repo.find_all(MAX_STATUS_CHECKS).await
    }
}
