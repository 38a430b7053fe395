use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

use crate::errors::AppError;
use crate::models::{ChatSession, CreateSessionParams, NewChatMessage, SuccessResponse};
use crate::routes::{json_body, AppState};

/// POST `/api/chat/sessions` — `userId`, `task` and optional `title` come from
/// the query string, a JSON body, or both (query wins).
pub async fn create_session_handler(
    State(state): State<AppState>,
    query: Result<Query<CreateSessionParams>, QueryRejection>,
    body: Bytes,
) -> Result<Json<ChatSession>, AppError> {
    let Query(from_query) =
        query.map_err(|rejection| AppError::InvalidBody { message: rejection.body_text() })?;

    let from_body = if body.iter().all(u8::is_ascii_whitespace) {
        CreateSessionParams::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::InvalidBody { message: e.to_string() })?
    };

    let params = from_query.or(from_body);
    let user_id = params
        .user_id
        .ok_or_else(|| AppError::MissingField { field_name: "userId".to_string() })?;
    let task = params
        .task
        .ok_or_else(|| AppError::MissingField { field_name: "task".to_string() })?;

    let session = state
        .sessions
        .create_session(&user_id, &task, params.title.as_deref())
        .await?;
    Ok(Json(session))
}

/// GET `/api/chat/sessions/:userId/:task` — at most 100, most recently updated first
pub async fn list_sessions_handler(
    State(state): State<AppState>,
    Path((user_id, task)): Path<(String, String)>,
) -> Result<Json<Vec<ChatSession>>, AppError> {
    Ok(Json(state.sessions.list_sessions(&user_id, &task).await?))
}

/// GET `/api/chat/sessions/:id`
pub async fn get_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ChatSession>, AppError> {
    Ok(Json(state.sessions.get_session(&session_id).await?))
}

/// POST `/api/chat/sessions/:id/messages`
pub async fn append_message_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<NewChatMessage>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let message = json_body(payload)?;
    state.sessions.append_message(&session_id, message).await?;
    Ok(Json(SuccessResponse { success: true }))
}
