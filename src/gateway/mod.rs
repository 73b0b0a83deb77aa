//! # Weather Gateway
//!
//! Cache-aside orchestration for the three query types. Each operation:
//!
//! 1. validates its input (no I/O on failure)
//! 2. builds a [`CacheKey`] and consults the cache
//! 3. on a miss, calls the upstream under its timeout
//! 4. reshapes the payload and stores it with the policy TTL
//!
//! Upstream failures are returned as [`GatewayError::Upstream`] and are never
//! cached. Every call counts toward `weather_requests_total`.

pub mod reshape;
pub mod types;
pub mod validation;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use crate::cache::key::round_coordinate;
use crate::cache::{CacheKey, CacheProvider, QueryKey};
use crate::config::CacheTtlConfig;
use crate::constants::metric_names;
use crate::error::{GatewayError, GatewayResult, UpstreamError};
use crate::metrics::MetricsRegistry;
use crate::upstream::WeatherUpstream;

pub use types::{ForecastDay, LocationMatch, WeatherSnapshot};

#[derive(Debug, Clone)]
pub struct WeatherGateway {
    upstream: Arc<dyn WeatherUpstream>,
    cache: CacheProvider,
    metrics: Arc<MetricsRegistry>,
    ttl: CacheTtlConfig,
}

impl WeatherGateway {
    pub fn new(
        upstream: Arc<dyn WeatherUpstream>,
        cache: CacheProvider,
        metrics: Arc<MetricsRegistry>,
        ttl: CacheTtlConfig,
    ) -> Self {
        Self {
            upstream,
            cache,
            metrics,
            ttl,
        }
    }

    pub fn cache(&self) -> &CacheProvider {
        &self.cache
    }

    pub fn upstream(&self) -> &Arc<dyn WeatherUpstream> {
        &self.upstream
    }

    /// Current conditions at `(lat, lon)`
    pub async fn current_conditions(&self, lat: f64, lon: f64) -> GatewayResult<WeatherSnapshot> {
        self.metrics.increment(metric_names::WEATHER_REQUESTS_TOTAL);
        validation::validate_coordinates(lat, lon)?;
        let (lat, lon) = (round_coordinate(lat), round_coordinate(lon));

        let key = QueryKey::CurrentConditions { lat, lon }.build();
        self.cache_aside(
            key,
            self.ttl.current(),
            metric_names::OP_CURRENT_WEATHER_FETCH,
            || async move {
                let payload = self.upstream.current(lat, lon).await?;
                reshape::snapshot(payload, lat, lon, Utc::now())
            },
        )
        .await
    }

    /// Daily forecast for the next `days` calendar days (1 to 7)
    pub async fn forecast(&self, lat: f64, lon: f64, days: u32) -> GatewayResult<Vec<ForecastDay>> {
        self.metrics.increment(metric_names::WEATHER_REQUESTS_TOTAL);
        validation::validate_coordinates(lat, lon)?;
        validation::validate_days(days)?;
        let (lat, lon) = (round_coordinate(lat), round_coordinate(lon));

        let key = QueryKey::Forecast { lat, lon, days }.build();
        self.cache_aside(
            key,
            self.ttl.forecast(),
            metric_names::OP_FORECAST_FETCH,
            || async move {
                let payload = self.upstream.forecast(lat, lon).await?;
                reshape::forecast_days(payload, days as usize)
            },
        )
        .await
    }

    /// Geocode free text, preserving provider order, at most `limit` hits
    pub async fn search_locations(
        &self,
        query: &str,
        limit: u32,
    ) -> GatewayResult<Vec<LocationMatch>> {
        self.metrics.increment(metric_names::WEATHER_REQUESTS_TOTAL);
        let query = validation::validate_search(query, limit)?;

        let key = QueryKey::LocationSearch { query, limit }.build();
        self.cache_aside(
            key,
            self.ttl.location_search(),
            metric_names::OP_LOCATION_SEARCH_FETCH,
            || async move {
                let hits = self.upstream.geocode(query, limit).await?;
                Ok(reshape::location_matches(hits, limit as usize))
            },
        )
        .await
    }

    async fn cache_aside<T, F, Fut>(
        &self,
        key: CacheKey,
        ttl: Duration,
        operation: &'static str,
        fetch: F,
    ) -> GatewayResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        if let Some(hit) = self.cache.get_json::<T>(key.as_str()).await {
            self.metrics.increment(metric_names::WEATHER_CACHE_HITS_TOTAL);
            return Ok(hit);
        }
        self.metrics.increment(metric_names::WEATHER_CACHE_MISSES_TOTAL);

        match self.metrics.time(operation, fetch()).await {
            Ok(value) => {
                self.cache.set_json(key.as_str(), &value, ttl).await;
                debug!(key = %key, operation = operation, "Upstream result cached");
                Ok(value)
            }
            Err(e) => {
                self.metrics.increment(metric_names::WEATHER_API_ERRORS_TOTAL);
                error!(key = %key, operation = operation, error = %e, "Upstream fetch failed");
                Err(GatewayError::Upstream(e))
            }
        }
    }
}
