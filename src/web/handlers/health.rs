//! # Health Check Handlers
//!
//! Kubernetes-compatible probe endpoints. Each handler forwards to
//! [`HealthService`](crate::health::HealthService) and maps the verdict to a
//! status code.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::error;

use crate::health::{DeepHealth, HealthSummary, ProbeStatus};
use crate::web::errors::ApiError;
use crate::web::state::AppState;

fn with_status<T: Serialize>(status: ProbeStatus, body: T) -> Response {
    let code = StatusCode::from_u16(status.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (code, Json(body)).into_response()
}

/// Basic health: GET /health
pub async fn basic_health(State(state): State<AppState>) -> Response {
    let health = state.health.basic_health().await;
    with_status(health.status, health)
}

/// Kubernetes readiness probe: GET /ready
pub async fn readiness_probe(State(state): State<AppState>) -> Response {
    match state.health.readiness().await {
        Ok(ready) => with_status(ready.status, ready),
        Err(not_ready) => with_status(not_ready.status, not_ready),
    }
}

/// Kubernetes liveness probe: GET /live
pub async fn liveness_probe(State(state): State<AppState>) -> Response {
    match state.health.liveness().await {
        Ok(alive) => with_status(alive.status, alive),
        Err(dead) => with_status(dead.status, dead),
    }
}

/// Dependency status: GET /health/dependencies
///
/// 200 when all pass, 207 when some fail.
pub async fn dependencies_health(State(state): State<AppState>) -> Response {
    let dependencies = state.health.dependencies().await;
    with_status(dependencies.status, dependencies)
}

/// Flat metrics mapping: GET /metrics
pub async fn metrics(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, serde_json::Value>>, ApiError> {
    state.health.metrics_snapshot().await.map(Json).map_err(|e| {
        error!(error = %e, "Metrics collection failed");
        ApiError::from(e)
    })
}

/// Dashboard roll-up: GET /health/summary
pub async fn health_summary(
    State(state): State<AppState>,
) -> Result<Json<HealthSummary>, ApiError> {
    state.health.summary().await.map(Json).map_err(|e| {
        error!(error = %e, "Health summary failed");
        ApiError::from(e)
    })
}

/// Every probe in one payload: GET /health/deep
pub async fn deep_health(State(state): State<AppState>) -> Result<Json<DeepHealth>, ApiError> {
    state.health.deep().await.map(Json).map_err(|e| {
        error!(error = %e, "Deep health check failed");
        ApiError::from(e)
    })
}
