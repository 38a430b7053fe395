use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::{GenerateRequest, GenerationRecord, StatusCheck, StatusCheckCreate};
use crate::routes::{json_body, AppState};

/// GET `/api` — service banner
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "MUN Assistant API - Local Session Management" }))
}

/// POST `/api/status`
pub async fn create_status_check_handler(
    State(state): State<AppState>,
    payload: Result<Json<StatusCheckCreate>, JsonRejection>,
) -> Result<Json<StatusCheck>, AppError> {
    let input = json_body(payload)?;
    let check = state.status.record(input.client_name).await?;
    Ok(Json(check))
}

/// GET `/api/status` — at most 1000, oldest first
pub async fn list_status_checks_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<StatusCheck>>, AppError> {
    Ok(Json(state.status.list().await?))
}

/// POST `/api/generate`
pub async fn generate_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerationRecord>, AppError> {
    let request = json_body(payload)?;
    let record = state.generation.generate(request).await?;
    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{app, get, post_json, send};

    const TASKS: [&str; 12] = [
        "research",
        "amendments",
        "situation assessment",
        "directive",
        "draft resolution",
        "background guide",
        "poi/poo/r2r",
        "post assessment",
        "probable outcomes",
        "rebuttal",
        "speech",
        "strategy",
    ];

    #[tokio::test]
    async fn status_checks_round_trip() {
        let app = app();
        let (status, created) =
            send(&app, post_json("/api/status", json!({ "client_name": "test_client" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["client_name"], "test_client");
        assert!(created["id"].is_string());
        assert!(created["timestamp"].is_string());

        let (status, listed) = send(&app, get("/api/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["id"], created["id"]);
    }

    #[tokio::test]
    async fn generate_returns_full_record_for_every_task() {
        let app = app();
        for task in TASKS {
            let prompt = format!("Test prompt for {task} task");
            let (status, body) = send(
                &app,
                post_json("/api/generate", json!({ "userId": "u1", "task": task, "prompt": prompt })),
            )
            .await;
            assert_eq!(status, StatusCode::OK, "task {task}");
            for field in ["id", "userId", "task", "prompt", "response", "timestamp"] {
                assert!(body.get(field).is_some(), "task {task} missing {field}");
            }
            assert!(body["response"].as_str().unwrap().contains(&prompt));
        }
    }

    #[tokio::test]
    async fn generate_rejects_malformed_body_with_422() {
        let app = app();
        let (status, body) = send(&app, post_json("/api/generate", json!({ "invalid": "data" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());

        let broken = Request::post("/api/generate")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _) = send(&app, broken).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn generate_rejects_empty_user_id() {
        let app = app();
        let (status, body) = send(
            &app,
            post_json("/api/generate", json!({ "userId": "", "task": "speech", "prompt": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "Field 'userId' cannot be empty");
    }

    #[tokio::test]
    async fn generate_with_unknown_task_uses_fallback() {
        let app = app();
        let (status, body) = send(
            &app,
            post_json("/api/generate", json!({ "userId": "u1", "task": "lobbying", "prompt": "Bloc A" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "I'll help you with lobbying. Here's my analysis of: Bloc A");
    }
}
