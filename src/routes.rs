use crate::infra::AppState;
use crate::scheduling;
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

pub(crate) fn service_routes(app: axum::Router) -> axum::Router {
    app.route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/timezones",
            axum::routing::get(timezones_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimezoneQuery {
    pub(crate) country: String,
    #[serde(default)]
    pub(crate) state: Option<String>,
}

/// Zone lookup used by posting forms to decide whether a manual zone prompt
/// is required.
pub(crate) async fn timezones_endpoint(Query(query): Query<TimezoneQuery>) -> impl IntoResponse {
    match scheduling::timezones_for(&query.country, query.state.as_deref()) {
        Some(zones) => {
            let views: Vec<_> = zones.iter().map(|zone| zone.view()).collect();
            let payload = json!({
                "country": query.country,
                "state": query.state,
                "zones": views,
                "multiple": views.len() > 1,
            });
            (StatusCode::OK, Json(payload))
        }
        None => {
            let payload = json!({
                "error": format!(
                    "no timezone data for location {}/{}",
                    query.country,
                    query.state.as_deref().unwrap_or("-")
                ),
            });
            (StatusCode::NOT_FOUND, Json(payload))
        }
    }
}
