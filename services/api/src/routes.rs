use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use franchise_hub::workflows::enquiries::{
    enquiry_router, EnquiryIntakeService, EnquiryNotifier, EnquiryRepository,
};
use franchise_hub::workflows::franchises::{
    franchise_router, FranchiseDirectory, FranchiseDirectoryService,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_service_routes<R, D, N>(
    intake: Arc<EnquiryIntakeService<R, D, N>>,
    directory: Arc<FranchiseDirectoryService<D>>,
) -> axum::Router
where
    R: EnquiryRepository + 'static,
    D: FranchiseDirectory + 'static,
    N: EnquiryNotifier + 'static,
{
    enquiry_router(intake)
        .merge(franchise_router(directory))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
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
