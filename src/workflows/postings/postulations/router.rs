use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{PostulationDetails, PostulationId};
use super::repository::PostulationRepository;
use super::service::{PostulationService, PostulationServiceError};
use crate::workflows::postings::domain::{Actor, LifecycleError, PostingId, TutorId};
use crate::workflows::postings::repository::{
    NotificationDispatcher, PostingRepository, RepositoryError,
};

/// Router builder exposing HTTP endpoints for the postulation lifecycle.
pub fn postulation_router<S, R, N>(service: Arc<PostulationService<S, R, N>>) -> Router
where
    S: PostulationRepository + 'static,
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    Router::new()
        .route(
            "/api/v1/postings/:posting_id/postulations",
            post(create_handler::<S, R, N>).get(list_handler::<S, R, N>),
        )
        .route(
            "/api/v1/postulations/:postulation_id",
            get(status_handler::<S, R, N>),
        )
        .route(
            "/api/v1/postulations/:postulation_id/accept",
            post(accept_handler::<S, R, N>),
        )
        .route(
            "/api/v1/postulations/:postulation_id/reject",
            post(reject_handler::<S, R, N>),
        )
        .route(
            "/api/v1/postulations/:postulation_id/withdraw",
            post(withdraw_handler::<S, R, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct CreatePostulationRequest {
    actor: Actor,
    tutor_id: TutorId,
    cover_letter: String,
    #[serde(default)]
    teaching_approach: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RespondRequest {
    actor: Actor,
    #[serde(default)]
    response_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActorRequest {
    actor: Actor,
}

fn error_response(error: PostulationServiceError) -> Response {
    let status = match &error {
        PostulationServiceError::Lifecycle(LifecycleError::Unauthorized { .. }) => {
            StatusCode::FORBIDDEN
        }
        PostulationServiceError::Lifecycle(_) => StatusCode::CONFLICT,
        PostulationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PostulationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        PostulationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

async fn create_handler<S, R, N>(
    State(service): State<Arc<PostulationService<S, R, N>>>,
    Path(posting_id): Path<String>,
    axum::Json(request): axum::Json<CreatePostulationRequest>,
) -> Response
where
    S: PostulationRepository + 'static,
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let details = PostulationDetails {
        cover_letter: request.cover_letter,
        teaching_approach: request.teaching_approach,
    };

    match service.create(
        &PostingId(posting_id),
        request.tutor_id,
        details,
        &request.actor,
        Utc::now(),
    ) {
        Ok(postulation) => (StatusCode::CREATED, axum::Json(postulation.view())).into_response(),
        Err(error) => error_response(error),
    }
}

async fn list_handler<S, R, N>(
    State(service): State<Arc<PostulationService<S, R, N>>>,
    Path(posting_id): Path<String>,
) -> Response
where
    S: PostulationRepository + 'static,
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.list_for_posting(&PostingId(posting_id)) {
        Ok(postulations) => {
            let views: Vec<_> = postulations
                .iter()
                .map(|postulation| postulation.view())
                .collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn status_handler<S, R, N>(
    State(service): State<Arc<PostulationService<S, R, N>>>,
    Path(postulation_id): Path<String>,
) -> Response
where
    S: PostulationRepository + 'static,
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.get(&PostulationId(postulation_id)) {
        Ok(postulation) => (StatusCode::OK, axum::Json(postulation.view())).into_response(),
        Err(error) => error_response(error),
    }
}

async fn accept_handler<S, R, N>(
    State(service): State<Arc<PostulationService<S, R, N>>>,
    Path(postulation_id): Path<String>,
    axum::Json(request): axum::Json<RespondRequest>,
) -> Response
where
    S: PostulationRepository + 'static,
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.accept(
        &PostulationId(postulation_id),
        request.response_notes,
        &request.actor,
        Utc::now(),
    ) {
        Ok(postulation) => (StatusCode::OK, axum::Json(postulation.view())).into_response(),
        Err(error) => error_response(error),
    }
}

async fn reject_handler<S, R, N>(
    State(service): State<Arc<PostulationService<S, R, N>>>,
    Path(postulation_id): Path<String>,
    axum::Json(request): axum::Json<RespondRequest>,
) -> Response
where
    S: PostulationRepository + 'static,
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.reject(
        &PostulationId(postulation_id),
        request.response_notes,
        &request.actor,
        Utc::now(),
    ) {
        Ok(postulation) => (StatusCode::OK, axum::Json(postulation.view())).into_response(),
        Err(error) => error_response(error),
    }
}

async fn withdraw_handler<S, R, N>(
    State(service): State<Arc<PostulationService<S, R, N>>>,
    Path(postulation_id): Path<String>,
    axum::Json(request): axum::Json<ActorRequest>,
) -> Response
where
    S: PostulationRepository + 'static,
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.withdraw(&PostulationId(postulation_id), &request.actor) {
        Ok(postulation) => (StatusCode::OK, axum::Json(postulation.view())).into_response(),
        Err(error) => error_response(error),
    }
}
