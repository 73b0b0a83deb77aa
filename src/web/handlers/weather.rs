//! # Weather Query Handlers
//!
//! Query-string parsing lives here; range validation belongs to the gateway.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::constants::limits;
use crate::gateway::WeatherSnapshot;
use crate::web::errors::ApiError;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CoordinateParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(alias = "query")]
    pub q: Option<String>,
    pub limit: Option<u32>,
}

fn parsed<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    params
        .map(|Query(inner)| inner)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

fn required_coordinates(lat: Option<f64>, lon: Option<f64>) -> Result<(f64, f64), ApiError> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => Err(ApiError::bad_request("Latitude and longitude are required")),
    }
}

/// Current conditions: GET /api/weather/current
pub async fn current_weather(
    State(state): State<AppState>,
    params: Result<Query<CoordinateParams>, QueryRejection>,
) -> Result<Json<WeatherSnapshot>, ApiError> {
    let params = parsed(params)?;
    let (lat, lon) = required_coordinates(params.lat, params.lon)?;
    debug!(lat, lon, "Current weather request");

    let snapshot = state.gateway.current_conditions(lat, lon).await?;
    Ok(Json(snapshot))
}

/// Daily forecast: GET /api/weather/forecast
pub async fn forecast(
    State(state): State<AppState>,
    params: Result<Query<ForecastParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let params = parsed(params)?;
    let (lat, lon) = required_coordinates(params.lat, params.lon)?;
    let days = params.days.unwrap_or(limits::DEFAULT_FORECAST_DAYS);
    debug!(lat, lon, days, "Forecast request");

    let forecast = state.gateway.forecast(lat, lon, days).await?;
    Ok(Json(json!({ "forecast": forecast })))
}

/// Location search: GET /api/locations/search
pub async fn search_locations(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let params = parsed(params)?;
    let query = params.q.unwrap_or_default();
    let limit = params.limit.unwrap_or(limits::DEFAULT_SEARCH_LIMIT);
    debug!(query = %query, limit, "Location search request");

    let locations = state.gateway.search_locations(&query, limit).await?;
    Ok(Json(json!({ "locations": locations })))
}
