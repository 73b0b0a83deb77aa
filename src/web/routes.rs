//! # Web API Route Definitions

use crate::web::handlers;
use crate::web::state::AppState;
use axum::routing::get;
use axum::Router;

/// Service index: `/`
pub fn index_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::index))
}

/// Weather query routes
///
/// - `/api/weather/current?lat=&lon=`
/// - `/api/weather/forecast?lat=&lon=&days=`
/// - `/api/locations/search?q=&limit=`
pub fn weather_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/weather/current",
            get(handlers::weather::current_weather),
        )
        .route("/api/weather/forecast", get(handlers::weather::forecast))
        .route(
            "/api/locations/search",
            get(handlers::weather::search_locations),
        )
}

/// Health and metrics routes
///
/// - `/health` - Basic health
/// - `/ready` - Kubernetes readiness probe
/// - `/live` - Kubernetes liveness probe
/// - `/health/dependencies` - External dependency status
/// - `/health/summary` - Dashboard roll-up
/// - `/health/deep` - Every probe in one payload
/// - `/metrics` - Flat metrics mapping
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::basic_health))
        .route("/ready", get(handlers::health::readiness_probe))
        .route("/live", get(handlers::health::liveness_probe))
        .route(
            "/health/dependencies",
            get(handlers::health::dependencies_health),
        )
        .route("/health/summary", get(handlers::health::health_summary))
        .route("/health/deep", get(handlers::health::deep_health))
        .route("/metrics", get(handlers::health::metrics))
}
