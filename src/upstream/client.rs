//! OpenWeatherMap HTTP client

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error};

use super::payload::{CurrentPayload, ForecastPayload, GeocodeHit};
use super::{ProbeResponse, WeatherUpstream};
use crate::config::UpstreamConfig;
use crate::error::UpstreamError;

/// Longest error body kept in [`UpstreamError::Status`]
const MAX_ERROR_BODY: usize = 512;

#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    geo_base_url: String,
    units: String,
    timeout: Duration,
    probe_timeout: Duration,
    probe_city: String,
}

impl std::fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .field("geo_base_url", &self.geo_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenWeatherClient {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("weather-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: config
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            geo_base_url: config.geo_base_url.trim_end_matches('/').to_string(),
            units: config.units.clone(),
            timeout: config.timeout(),
            probe_timeout: config.probe_timeout(),
            probe_city: config.probe_city.clone(),
        })
    }

    fn api_key(&self) -> Result<&str, UpstreamError> {
        self.api_key.as_deref().ok_or(UpstreamError::NotConfigured)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let api_key = self.api_key()?;
        let started = Instant::now();

        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("appid", api_key)])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        debug!(
            url = url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Upstream response received"
        );

        if !status.is_success() {
            error!(url = url, status = status.as_u16(), "Upstream returned error status");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        serde_json::from_str(&body).map_err(|e| UpstreamError::Malformed(e.to_string()))
    }

    fn classify(&self, error: reqwest::Error) -> UpstreamError {
        if error.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            error.into()
        }
    }
}

#[async_trait]
impl WeatherUpstream for OpenWeatherClient {
    async fn current(&self, lat: f64, lon: f64) -> Result<CurrentPayload, UpstreamError> {
        let url = format!("{}/weather", self.base_url);
        self.get_json(
            &url,
            &[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", self.units.clone()),
            ],
        )
        .await
    }

    async fn forecast(&self, lat: f64, lon: f64) -> Result<ForecastPayload, UpstreamError> {
        let url = format!("{}/forecast", self.base_url);
        self.get_json(
            &url,
            &[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", self.units.clone()),
            ],
        )
        .await
    }

    async fn geocode(&self, query: &str, limit: u32) -> Result<Vec<GeocodeHit>, UpstreamError> {
        let url = format!("{}/direct", self.geo_base_url);
        self.get_json(
            &url,
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn probe(&self) -> Result<ProbeResponse, UpstreamError> {
        let api_key = self.api_key()?;
        let url = format!("{}/weather", self.base_url);
        let started = Instant::now();

        let request = self
            .client
            .get(&url)
            .query(&[("q", self.probe_city.as_str()), ("appid", api_key)])
            .timeout(self.probe_timeout)
            .send();

        let response = tokio::time::timeout(self.probe_timeout, request)
            .await
            .map_err(|_| UpstreamError::Timeout(self.probe_timeout))?
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Timeout(self.probe_timeout)
                } else {
                    e.into()
                }
            })?;

        Ok(ProbeResponse {
            status_code: response.status().as_u16(),
            elapsed: started.elapsed(),
        })
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| self.base_url.clone())
    }
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
