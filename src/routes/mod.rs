pub mod api_routes;
pub mod session_routes;

use std::any::Any;

use axum::extract::rejection::JsonRejection;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::config::CorsOrigins;
use crate::db::Store;
use crate::errors::AppError;
use crate::service::generation_service::GenerationService;
use crate::service::session_service::SessionService;
use crate::service::status_service::StatusService;

#[derive(Clone)]
pub struct AppState {
    pub status: StatusService,
    pub generation: GenerationService,
    pub sessions: SessionService,
}

impl AppState {
    pub fn new(store: &Store) -> Self {
        Self {
            status: StatusService::new(store.status_checks.clone()),
            generation: GenerationService::new(store.generations.clone()),
            sessions: SessionService::new(store.sessions.clone()),
        }
    }
}

/// Build the complete `/api` router with CORS, tracing and panic recovery.
pub fn build_router(state: AppState, cors_origins: &CorsOrigins) -> Router {
    Router::new()
        .route("/api", get(api_routes::root_handler))
        .route("/api/", get(api_routes::root_handler))
        .route(
            "/api/status",
            post(api_routes::create_status_check_handler).get(api_routes::list_status_checks_handler),
        )
        .route("/api/generate", post(api_routes::generate_handler))
        .route("/api/chat/sessions", post(session_routes::create_session_handler))
        .route("/api/chat/sessions/{id}", get(session_routes::get_session_handler))
        .route(
            "/api/chat/sessions/{id}/messages",
            post(session_routes::append_message_handler),
        )
        // `{id}` is the user id here; the segment name must match the routes above.
        .route("/api/chat/sessions/{id}/{task}", get(session_routes::list_sessions_handler))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::any(),
        CorsOrigins::List(list) => AllowOrigin::list(list.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| warn!(%origin, "Ignoring invalid CORS origin"))
                .ok()
        })),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any)
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("Request handler panicked");
    AppError::Unexpected("handler panicked".to_string()).into_response()
}

/// Unwraps a JSON body, turning any rejection (bad syntax, wrong types,
/// missing fields, wrong content type) into a 422.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::InvalidBody { message: rejection.body_text() })
}
