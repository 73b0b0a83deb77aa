//! Reshaped response records served to clients and stored in the cache

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions at a point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: SnapshotLocation,
    pub current: CurrentConditions,
    pub sun: SunTimes,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotLocation {
    pub name: String,
    pub country: String,
    /// Echoed from the request, not the provider's snapped coordinates
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Degrees, rounded to the nearest integer
    pub temperature: i64,
    pub feels_like: i64,
    pub humidity: i64,
    pub pressure: i64,
    pub visibility_km: f64,
    pub wind: Wind,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    /// Degrees from north
    pub direction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// Local `HH:MM` clock times at the location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: String,
    pub sunset: String,
}

/// One calendar day of an aggregated forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temperature: TemperatureRange,
    pub condition: DayCondition,
    pub humidity: i64,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: i64,
    pub max: i64,
    pub avg: i64,
}

/// Most frequent condition of the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCondition {
    pub main: String,
    pub description: String,
}

/// A geocoder hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMatch {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}
