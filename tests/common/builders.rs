//! Payload fixtures and a fully wired service harness

use serde_json::{json, Value};
use std::sync::Arc;

use weather_gateway::cache::{CacheProvider, ManualClock, TimedCache};
use weather_gateway::config::{CacheConfig, GatewayConfig, HealthConfig};
use weather_gateway::health::{HealthDependencies, HealthService};
use weather_gateway::web::state::AppState;
use weather_gateway::{MetricsRegistry, WeatherGateway};

use super::fakes::{FakeDatastore, FakeSampler, FakeUpstream};

/// 2024-03-01T00:00:00Z
pub const FORECAST_START_UNIX: i64 = 1_709_251_200;
pub const THREE_HOURS: i64 = 3 * 60 * 60;

pub fn current_payload_json(name: &str) -> Value {
    json!({
        "name": name,
        "main": {"temp": 15.4, "feels_like": 14.6, "humidity": 72, "pressure": 1012},
        "visibility": 10000,
        "wind": {"speed": 4.1, "deg": 240},
        "weather": [{"main": "Clouds", "description": "broken clouds", "icon": "04d"}],
        "sys": {"country": "GB", "sunrise": 1_709_276_400, "sunset": 1_709_316_000},
        "timezone": 0
    })
}

/// Eight 3-hourly points per local day, starting at local midnight
///
/// Within each day temperatures run 10..=17, the first five points are
/// "Clouds" and the last three "Rain".
pub fn forecast_payload_json(days: usize, utc_offset_seconds: i32) -> Value {
    let list: Vec<Value> = (0..days * 8)
        .map(|i| {
            let slot = (i % 8) as i64;
            let (main, description) = if slot < 5 {
                ("Clouds", "scattered clouds")
            } else {
                ("Rain", "light rain")
            };
            json!({
                "dt": FORECAST_START_UNIX + i as i64 * THREE_HOURS - i64::from(utc_offset_seconds),
                "main": {"temp": 10.0 + slot as f64, "humidity": 70},
                "weather": [{"main": main, "description": description, "icon": "03d"}],
                "wind": {"speed": 3.26}
            })
        })
        .collect();

    json!({"list": list, "city": {"timezone": utc_offset_seconds}})
}

pub fn geocode_hits_json(count: usize) -> Value {
    let hits: Vec<Value> = (0..count)
        .map(|i| {
            let mut hit = json!({
                "name": format!("City {i}"),
                "country": "GB",
                "lat": 51.0 + i as f64 / 10.0,
                "lon": -0.1 - i as f64 / 10.0
            });
            if i % 2 == 0 {
                hit["state"] = json!("England");
            }
            hit
        })
        .collect();
    Value::Array(hits)
}

/// Probe settings with warmup disabled so readiness can pass immediately
pub fn test_health_config() -> HealthConfig {
    HealthConfig {
        warmup_seconds: 0,
        basic_memo_seconds: 0,
        ..HealthConfig::default()
    }
}

pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        environment: "test".to_string(),
        health: test_health_config(),
        ..GatewayConfig::default()
    }
}

/// Cache provider whose backend was unavailable at startup
pub async fn unreachable_cache() -> CacheProvider {
    CacheProvider::from_config_graceful(&CacheConfig {
        backend: "redis".to_string(),
        redis_url: None,
        ..CacheConfig::default()
    })
    .await
}

/// Gateway and probes wired to fakes
#[derive(Debug)]
pub struct Harness {
    pub upstream: Arc<FakeUpstream>,
    pub sampler: Arc<FakeSampler>,
    pub datastore: Arc<FakeDatastore>,
    pub metrics: Arc<MetricsRegistry>,
    pub clock: Arc<ManualClock>,
    pub cache: CacheProvider,
    pub state: AppState,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new());
        let cache = CacheProvider::memory(TimedCache::with_clock(clock.clone()));
        Self::build(cache, clock, test_config())
    }

    pub fn with_cache(cache: CacheProvider) -> Self {
        Self::build(cache, Arc::new(ManualClock::new()), test_config())
    }

    pub fn with_config(config: GatewayConfig) -> Self {
        let clock = Arc::new(ManualClock::new());
        let cache = CacheProvider::memory(TimedCache::with_clock(clock.clone()));
        Self::build(cache, clock, config)
    }

    fn build(cache: CacheProvider, clock: Arc<ManualClock>, config: GatewayConfig) -> Self {
        let upstream = Arc::new(FakeUpstream::new());
        let sampler = Arc::new(FakeSampler::new());
        let datastore = Arc::new(FakeDatastore::reachable());
        let metrics = Arc::new(MetricsRegistry::new());

        let gateway = WeatherGateway::new(
            upstream.clone(),
            cache.clone(),
            metrics.clone(),
            config.cache.ttl.clone(),
        );
        let health = HealthService::new(
            HealthDependencies {
                cache: cache.clone(),
                datastore: datastore.clone(),
                upstream: upstream.clone(),
                sampler: sampler.clone(),
                metrics: metrics.clone(),
            },
            config.health.clone(),
            config.environment.clone(),
        );

        Self {
            upstream,
            sampler,
            datastore,
            metrics,
            clock,
            cache,
            state: AppState::new(Arc::new(config), gateway, health),
        }
    }

    pub fn gateway(&self) -> &WeatherGateway {
        &self.state.gateway
    }

    pub fn health(&self) -> &HealthService {
        &self.state.health
    }
}
