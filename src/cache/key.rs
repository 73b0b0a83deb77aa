//! Deterministic cache keys
//!
//! A key is a type discriminator followed by every parameter that changes the
//! upstream response. Coordinates are fixed at four decimal places, the
//! granularity the upstream reports coordinates at.

use crate::constants::limits::COORDINATE_KEY_PRECISION;
use std::fmt;

/// A query the gateway can cache
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryKey<'a> {
    CurrentConditions { lat: f64, lon: f64 },
    Forecast { lat: f64, lon: f64, days: u32 },
    LocationSearch { query: &'a str, limit: u32 },
}

/// Opaque cache key string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl QueryKey<'_> {
    pub fn build(&self) -> CacheKey {
        let key = match *self {
            Self::CurrentConditions { lat, lon } => {
                format!("current_weather:{}:{}", coordinate(lat), coordinate(lon))
            }
            Self::Forecast { lat, lon, days } => {
                format!("forecast:{}:{}:{days}", coordinate(lat), coordinate(lon))
            }
            // Limit first: the free-text query may itself contain ':'
            Self::LocationSearch { query, limit } => {
                format!("location_search:{limit}:{}", normalize_query(query))
            }
        };
        CacheKey(key)
    }
}

/// Snap a coordinate to key precision. Queries that share a key must also
/// share the coordinates sent upstream and echoed back.
pub fn round_coordinate(value: f64) -> f64 {
    let scale = 10f64.powi(COORDINATE_KEY_PRECISION as i32);
    let rounded = (value * scale).round() / scale;
    // -0.0 and 0.0 are the same query
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn coordinate(value: f64) -> String {
    format!("{:.prec$}", round_coordinate(value), prec = COORDINATE_KEY_PRECISION)
}

/// Trim, lowercase and collapse internal whitespace
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
