mod bookings;
mod listings;
mod users;

use crate::infra::{ApiContext, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Resource routes plus the operational endpoints. Callers still need to attach
/// an `Extension<AppState>` for `/ready` and `/metrics`.
pub(crate) fn api_router(context: Arc<ApiContext>) -> Router {
    Router::new()
        .merge(listings::router())
        .merge(bookings::router())
        .merge(users::router())
        .with_state(context)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
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


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::infra::fixtures::context_in;

    #[tokio::test]
    async fn health_reports_ok() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = app(Arc::new(context_in(dir.path())));

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = api_router(Arc::new(context_in(dir.path())))
            .layer(Extension(app_state(false)));

        let (status, body) = send(&app, "GET", "/ready", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");
    }
}
