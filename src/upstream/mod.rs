//! # Upstream Weather Provider
//!
//! The gateway talks to the provider only through [`WeatherUpstream`], so
//! tests can substitute a scripted fake for [`OpenWeatherClient`].

pub mod client;
pub mod payload;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::UpstreamError;

pub use client::OpenWeatherClient;
pub use payload::{CurrentPayload, ForecastPayload, GeocodeHit};

/// Outcome of a reachability probe against the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status_code: u16,
    pub elapsed: Duration,
}

impl ProbeResponse {
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Point-weather, forecast and geocoding calls, all bounded by a timeout
#[async_trait]
pub trait WeatherUpstream: Send + Sync + std::fmt::Debug {
    async fn current(&self, lat: f64, lon: f64) -> Result<CurrentPayload, UpstreamError>;

    /// Fine-grained (3-hourly) series covering several days
    async fn forecast(&self, lat: f64, lon: f64) -> Result<ForecastPayload, UpstreamError>;

    async fn geocode(&self, query: &str, limit: u32) -> Result<Vec<GeocodeHit>, UpstreamError>;

    /// Cheap request used by readiness and dependency probes
    async fn probe(&self) -> Result<ProbeResponse, UpstreamError>;

    fn is_configured(&self) -> bool;

    /// Host name reported in probe details
    fn endpoint(&self) -> String;
}
