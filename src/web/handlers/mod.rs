//! # Web API Request Handlers

pub mod health;
pub mod weather;

use axum::Json;
use serde_json::{json, Value};

use crate::constants::{SERVICE_NAME, SERVICE_VERSION};
use crate::health::service::endpoint_directory;
use crate::web::errors::ApiError;

/// Service index: GET /
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Weather API Service",
        "service": SERVICE_NAME,
        "version": SERVICE_VERSION,
        "endpoints": {
            "current_weather": "/api/weather/current?lat={lat}&lon={lon}",
            "forecast": "/api/weather/forecast?lat={lat}&lon={lon}&days={days}",
            "search_locations": "/api/locations/search?q={query}&limit={limit}",
            "health": endpoint_directory(),
        }
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}
