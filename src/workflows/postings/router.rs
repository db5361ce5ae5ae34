use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{Actor, InstitutionId, LifecycleError, PostingId, StudentRecord, TutorId};
use super::repository::{NotificationDispatcher, PostingRepository, RepositoryError};
use super::service::{JobPostingService, NewPosting, PostingServiceError};
use crate::scheduling::TimestampInput;

/// Router builder exposing HTTP endpoints for the posting lifecycle.
pub fn posting_router<R, N>(service: Arc<JobPostingService<R, N>>) -> Router
where
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    Router::new()
        .route(
            "/api/v1/postings",
            post(create_handler::<R, N>).get(published_handler::<R, N>),
        )
        .route("/api/v1/postings/:posting_id", get(status_handler::<R, N>))
        .route(
            "/api/v1/postings/:posting_id/publish",
            post(publish_handler::<R, N>),
        )
        .route(
            "/api/v1/postings/:posting_id/assign",
            post(assign_handler::<R, N>),
        )
        .route(
            "/api/v1/postings/:posting_id/complete",
            post(complete_handler::<R, N>),
        )
        .route(
            "/api/v1/postings/:posting_id/cancel",
            post(cancel_handler::<R, N>),
        )
        .route(
            "/api/v1/postings/:posting_id/hide",
            post(hide_handler::<R, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatePostingRequest {
    pub(crate) actor: Actor,
    pub(crate) institution_id: InstitutionId,
    pub(crate) subject: String,
    pub(crate) country: String,
    #[serde(default)]
    pub(crate) state: Option<String>,
    #[serde(default)]
    pub(crate) timezone: Option<String>,
    pub(crate) starts_at: TimestampInput,
    pub(crate) duration_minutes: u32,
    #[serde(default)]
    pub(crate) students: Vec<StudentRecord>,
}

#[derive(Debug, Deserialize)]
struct ActorRequest {
    actor: Actor,
}

#[derive(Debug, Deserialize)]
struct AssignRequest {
    actor: Actor,
    tutor_id: TutorId,
}

pub(crate) fn error_response(error: PostingServiceError) -> Response {
    let status = match &error {
        PostingServiceError::Lifecycle(LifecycleError::Unauthorized { .. }) => {
            StatusCode::FORBIDDEN
        }
        PostingServiceError::Lifecycle(_) => StatusCode::CONFLICT,
        PostingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PostingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        PostingServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        PostingServiceError::Scheduling(_) | PostingServiceError::AmbiguousTimezone { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn create_handler<R, N>(
    State(service): State<Arc<JobPostingService<R, N>>>,
    axum::Json(request): axum::Json<CreatePostingRequest>,
) -> Response
where
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let starts_at = match request.starts_at.normalize() {
        Ok(starts_at) => starts_at,
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };

    let new_posting = NewPosting {
        institution_id: request.institution_id,
        subject: request.subject,
        country: request.country,
        state: request.state,
        timezone: request.timezone,
        date: starts_at.date(),
        start_time: starts_at.time(),
        duration_minutes: request.duration_minutes,
        students: request.students,
    };

    match service.create_draft(new_posting, &request.actor) {
        Ok(posting) => (StatusCode::CREATED, axum::Json(posting.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

const PUBLISHED_PAGE_SIZE: usize = 50;

pub(crate) async fn published_handler<R, N>(
    State(service): State<Arc<JobPostingService<R, N>>>,
) -> Response
where
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.published(PUBLISHED_PAGE_SIZE) {
        Ok(postings) => {
            let views: Vec<_> = postings.iter().map(|posting| posting.status_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, N>(
    State(service): State<Arc<JobPostingService<R, N>>>,
    Path(posting_id): Path<String>,
) -> Response
where
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.get(&PostingId(posting_id)) {
        Ok(posting) => (StatusCode::OK, axum::Json(posting.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn publish_handler<R, N>(
    State(service): State<Arc<JobPostingService<R, N>>>,
    Path(posting_id): Path<String>,
    axum::Json(request): axum::Json<ActorRequest>,
) -> Response
where
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.publish(&PostingId(posting_id), &request.actor) {
        Ok(posting) => (StatusCode::OK, axum::Json(posting.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn complete_handler<R, N>(
    State(service): State<Arc<JobPostingService<R, N>>>,
    Path(posting_id): Path<String>,
    axum::Json(request): axum::Json<ActorRequest>,
) -> Response
where
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.complete(&PostingId(posting_id), &request.actor) {
        Ok(posting) => (StatusCode::OK, axum::Json(posting.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_handler<R, N>(
    State(service): State<Arc<JobPostingService<R, N>>>,
    Path(posting_id): Path<String>,
    axum::Json(request): axum::Json<ActorRequest>,
) -> Response
where
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.cancel(&PostingId(posting_id), &request.actor) {
        Ok(posting) => (StatusCode::OK, axum::Json(posting.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn hide_handler<R, N>(
    State(service): State<Arc<JobPostingService<R, N>>>,
    Path(posting_id): Path<String>,
    axum::Json(request): axum::Json<ActorRequest>,
) -> Response
where
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.hide(&PostingId(posting_id), &request.actor) {
        Ok(posting) => (StatusCode::OK, axum::Json(posting.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn assign_handler<R, N>(
    State(service): State<Arc<JobPostingService<R, N>>>,
    Path(posting_id): Path<String>,
    axum::Json(request): axum::Json<AssignRequest>,
) -> Response
where
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.assign_tutor(&PostingId(posting_id), request.tutor_id, &request.actor) {
        Ok(posting) => (StatusCode::OK, axum::Json(posting.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}
