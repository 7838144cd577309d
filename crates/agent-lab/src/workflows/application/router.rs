use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::SessionId;
use super::repository::{RepositoryError, SessionRepository, SnapshotStore};
use super::service::{ApplicationAssistantService, ApplicationServiceError};

/// Body accepted by the message and resume endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TextPayload {
    pub text: String,
}

/// Router builder exposing the applicant intake session endpoints.
pub fn application_router<R, S>(service: Arc<ApplicationAssistantService<R, S>>) -> Router
where
    R: SessionRepository + 'static,
    S: SnapshotStore + 'static,
{
    Router::new()
        .route("/api/v1/sessions", post(start_handler::<R, S>))
        .route("/api/v1/sessions/:session_id", get(status_handler::<R, S>))
        .route(
            "/api/v1/sessions/:session_id/messages",
            post(message_handler::<R, S>),
        )
        .route(
            "/api/v1/sessions/:session_id/resume",
            post(resume_handler::<R, S>),
        )
        .route(
            "/api/v1/sessions/:session_id/reset",
            post(reset_handler::<R, S>),
        )
        .route(
            "/api/v1/sessions/:session_id/snapshot",
            post(snapshot_handler::<R, S>),
        )
        .route(
            "/api/v1/sessions/:session_id/summary",
            get(summary_handler::<R, S>),
        )
        .with_state(service)
}

pub(crate) async fn start_handler<R, S>(
    State(service): State<Arc<ApplicationAssistantService<R, S>>>,
) -> Response
where
    R: SessionRepository + 'static,
    S: SnapshotStore + 'static,
{
    match service.start_session() {
        Ok(session) => (StatusCode::CREATED, axum::Json(session.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<R, S>(
    State(service): State<Arc<ApplicationAssistantService<R, S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    S: SnapshotStore + 'static,
{
    match service.get(&SessionId(session_id)) {
        Ok(session) => (StatusCode::OK, axum::Json(session.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn message_handler<R, S>(
    State(service): State<Arc<ApplicationAssistantService<R, S>>>,
    Path(session_id): Path<String>,
    axum::Json(payload): axum::Json<TextPayload>,
) -> Response
where
    R: SessionRepository + 'static,
    S: SnapshotStore + 'static,
{
    match service.submit_message(&SessionId(session_id), &payload.text) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn resume_handler<R, S>(
    State(service): State<Arc<ApplicationAssistantService<R, S>>>,
    Path(session_id): Path<String>,
    axum::Json(payload): axum::Json<TextPayload>,
) -> Response
where
    R: SessionRepository + 'static,
    S: SnapshotStore + 'static,
{
    match service.import_resume(&SessionId(session_id), &payload.text) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reset_handler<R, S>(
    State(service): State<Arc<ApplicationAssistantService<R, S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    S: SnapshotStore + 'static,
{
    match service.reset(&SessionId(session_id)) {
        Ok(session) => (StatusCode::OK, axum::Json(session.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn snapshot_handler<R, S>(
    State(service): State<Arc<ApplicationAssistantService<R, S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    S: SnapshotStore + 'static,
{
    match service.snapshot(&SessionId(session_id)) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn summary_handler<R, S>(
    State(service): State<Arc<ApplicationAssistantService<R, S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    S: SnapshotStore + 'static,
{
    match service.get(&SessionId(session_id)) {
        Ok(session) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            session.record.summary(),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(error: ApplicationServiceError) -> Response {
    let status = match &error {
        ApplicationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
