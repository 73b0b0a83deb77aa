//! Upstream wire types
//!
//! Only the fields the gateway reshapes are modelled; everything else in the
//! provider's payload is ignored.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentPayload {
    pub name: String,
    pub main: MainReadings,
    /// Metres; absent in some regions
    #[serde(default)]
    pub visibility: Option<f64>,
    pub wind: WindReadings,
    pub weather: Vec<ConditionPayload>,
    pub sys: SunPayload,
    /// Seconds east of UTC
    #[serde(default)]
    pub timezone: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    pub humidity: f64,
    #[serde(default)]
    pub pressure: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindReadings {
    pub speed: f64,
    #[serde(default)]
    pub deg: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionPayload {
    pub main: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SunPayload {
    #[serde(default)]
    pub country: Option<String>,
    pub sunrise: i64,
    pub sunset: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastPayload {
    pub list: Vec<ForecastPoint>,
    #[serde(default)]
    pub city: Option<ForecastCity>,
}

impl ForecastPayload {
    pub fn utc_offset_seconds(&self) -> Option<i32> {
        self.city.as_ref().and_then(|c| c.timezone)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastPoint {
    /// Unix seconds
    pub dt: i64,
    pub main: MainReadings,
    pub weather: Vec<ConditionPayload>,
    pub wind: WindReadings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastCity {
    #[serde(default)]
    pub timezone: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeHit {
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}
