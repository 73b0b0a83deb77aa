//! # Web API Module
//!
//! Axum-based HTTP surface for the weather gateway.
//!
//! - [`routes`] - route groups for weather queries and health probes
//! - [`handlers`] - request handlers, one module per group
//! - [`state`] - shared application state
//! - [`errors`] - JSON error responses

pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::Router;
use state::AppState;

pub use errors::ApiError;

/// Create the Axum application with all routes and middleware
pub fn create_app(app_state: AppState) -> Router {
    let request_timeout =
        std::time::Duration::from_millis(app_state.config.server.request_timeout_ms);

    Router::new()
        .merge(routes::index_routes())
        .merge(routes::weather_routes())
        .merge(routes::health_routes())
        .fallback(handlers::not_found)
        .layer(tower_http::timeout::TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state)
}
