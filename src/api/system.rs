//! Health probes.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub struct HealthLiveResponse {
    pub status: &'static str,
    pub uptime_seconds: u64,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthReadinessChecks {
    pub product_store: bool,
    pub product_store_backend: &'static str,
    pub image_backend: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthReadyResponse {
    pub ready: bool,
    pub checks: HealthReadinessChecks,
}

/// `GET /api/system/health/live`
///
/// Lightweight liveness probe to indicate the API process is running.
pub async fn health_live(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::success(HealthLiveResponse {
        status: "alive",
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /api/system/health/ready`
///
/// Readiness probe that checks the product store can be reached.
pub async fn health_ready(State(state): State<Arc<AppState>>) -> Response {
    let store_ready = state.products.ping().await.is_ok();

    let status = if store_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(HealthReadyResponse {
            ready: store_ready,
            checks: HealthReadinessChecks {
                product_store: store_ready,
                product_store_backend: state.products.backend_name(),
                image_backend: state.images.backend_name(),
            },
        })),
    )
        .into_response()
}
