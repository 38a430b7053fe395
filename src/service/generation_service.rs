use std::sync::Arc;

use tracing::{debug, info};

use crate::db::GenerationRepository;
use crate::errors::AppError;
use crate::models::{GenerateRequest, GenerationRecord};
use crate::service::templates::{render_response, MunTask};

/// Turns a generation request into a canned response and records the
/// exchange. Nothing is returned unless the record was persisted.
#[derive(Clone)]
pub struct GenerationService {
    repo: Arc<dyn GenerationRepository>,
}

impl GenerationService {
    pub fn new(repo: Arc<dyn GenerationRepository>) -> Self {
        Self { repo }
    }

    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerationRecord, AppError> {
        // ── Validation ────────────────────────────────────────────────────────
        if request.user_id.trim().is_empty() {
            return Err(AppError::EmptyField { field_name: "userId".to_string() });
        }
        if request.task.trim().is_empty() {
            return Err(AppError::EmptyField { field_name: "task".to_string() });
        }

        // ── Respond ───────────────────────────────────────────────────────────
        if MunTask::from_name(&request.task).is_none() {
            debug!(task = %request.task, "Unknown task, using generic response");
        }
        let response = render_response(
            &request.task,
            &request.prompt,
            request.amendment_prompt.as_deref(),
        );

        let record = GenerationRecord::new(
            request.user_id,
            request.task,
            request.prompt,
            request.amendment_prompt,
            response,
        );

        // ── Persist ───────────────────────────────────────────────────────────
        // The repository logs the failure; nothing is returned without a stored record.
        self.repo.insert(&record).await?;

        info!(id = %record.id, user = %record.user_id, task = %record.task, "Generation recorded");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::db::memory::MemoryGenerationRepository;

    struct UnavailableRepository;

    #[async_trait]
    impl GenerationRepository for UnavailableRepository {
        async fn insert(&self, _record: &GenerationRecord) -> Result<(), AppError> {
            Err(AppError::db_query("Failed to save generation", sqlx::Error::PoolTimedOut))
        }
    }

    fn request(task: &str, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            user_id: "delegate-7".to_string(),
            task: task.to_string(),
            prompt: prompt.to_string(),
            amendment_prompt: None,
        }
    }

    #[tokio::test]
    async fn known_task_is_rendered_and_persisted() {
        let repo = Arc::new(MemoryGenerationRepository::default());
        let service = GenerationService::new(repo.clone());

        let record = service.generate(request("draft resolution", "Water security")).await.unwrap();
        assert_eq!(record.user_id, "delegate-7");
        assert!(record.response.contains("Water security"));
        assert!(record.response.contains("Operative Clauses"));

        assert_eq!(repo.all().await, vec![record]);
    }

    #[tokio::test]
    async fn unknown_task_falls_back() {
        let service = GenerationService::new(Arc::new(MemoryGenerationRepository::default()));
        let record = service.generate(request("press release", "Ceasefire")).await.unwrap();
        assert_eq!(
            record.response,
            "I'll help you with press release. Here's my analysis of: Ceasefire"
        );
    }

    #[tokio::test]
    async fn same_input_gives_same_response_but_new_identity() {
        let service = GenerationService::new(Arc::new(MemoryGenerationRepository::default()));
        let first = service.generate(request("strategy", "Arctic shipping")).await.unwrap();
        let second = service.generate(request("strategy", "Arctic shipping")).await.unwrap();
        assert_eq!(first.response, second.response);
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn empty_user_id_is_rejected() {
        let repo = Arc::new(MemoryGenerationRepository::default());
        let service = GenerationService::new(repo.clone());
        let mut req = request("speech", "x");
        req.user_id = "  ".to_string();

        let err = service.generate(req).await.unwrap_err();
        assert!(err.is_validation());
        assert!(repo.all().await.is_empty());
    }

    #[tokio::test]
    async fn empty_task_is_rejected() {
        let service = GenerationService::new(Arc::new(MemoryGenerationRepository::default()));
        let err = service.generate(request("", "x")).await.unwrap_err();
        assert!(matches!(err, AppError::EmptyField { ref field_name } if field_name == "task"));
    }

    #[tokio::test]
    async fn persistence_failure_returns_no_record() {
        let service = GenerationService::new(Arc::new(UnavailableRepository));
        let err = service.generate(request("research", "x")).await.unwrap_err();
        assert!(err.is_persistence());
    }

    #[tokio::test]
    async fn amendment_prompt_is_kept_on_record() {
        let service = GenerationService::new(Arc::new(MemoryGenerationRepository::default()));
        let mut req = request("amendments", "Clause 3");
        req.amendment_prompt = Some("Add 'voluntary'".to_string());

        let record = service.generate(req).await.unwrap();
        assert_eq!(record.amendment_prompt.as_deref(), Some("Add 'voluntary'"));
        assert!(record.response.contains("Add 'voluntary'"));
    }
}
