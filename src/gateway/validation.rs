//! Request validation
//!
//! Everything here runs before any cache or network I/O.

use crate::constants::limits;
use crate::error::{GatewayError, GatewayResult};

pub fn validate_coordinates(lat: f64, lon: f64) -> GatewayResult<()> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(GatewayError::validation("Invalid coordinates"));
    }
    if !(limits::MIN_LATITUDE..=limits::MAX_LATITUDE).contains(&lat) {
        return Err(GatewayError::validation(format!(
            "Latitude must be between {} and {}",
            limits::MIN_LATITUDE,
            limits::MAX_LATITUDE
        )));
    }
    if !(limits::MIN_LONGITUDE..=limits::MAX_LONGITUDE).contains(&lon) {
        return Err(GatewayError::validation(format!(
            "Longitude must be between {} and {}",
            limits::MIN_LONGITUDE,
            limits::MAX_LONGITUDE
        )));
    }
    Ok(())
}

pub fn validate_days(days: u32) -> GatewayResult<()> {
    if (limits::MIN_FORECAST_DAYS..=limits::MAX_FORECAST_DAYS).contains(&days) {
        Ok(())
    } else {
        Err(GatewayError::validation(format!(
            "Days must be between {} and {}",
            limits::MIN_FORECAST_DAYS,
            limits::MAX_FORECAST_DAYS
        )))
    }
}

/// Validate a location search and return the trimmed query
pub fn validate_search(query: &str, limit: u32) -> GatewayResult<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::validation("Search query is required"));
    }
    if trimmed.chars().count() < limits::MIN_SEARCH_QUERY_CHARS {
        return Err(GatewayError::validation(format!(
            "Search query must be at least {} characters",
            limits::MIN_SEARCH_QUERY_CHARS
        )));
    }
    if !(limits::MIN_SEARCH_LIMIT..=limits::MAX_SEARCH_LIMIT).contains(&limit) {
        return Err(GatewayError::validation(format!(
            "Limit must be between {} and {}",
            limits::MIN_SEARCH_LIMIT,
            limits::MAX_SEARCH_LIMIT
        )));
    }
    Ok(trimmed)
}
