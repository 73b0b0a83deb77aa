//! # Health Service
//!
//! Probe logic independent of the HTTP layer. Handlers call into this
//! service and only translate [`ProbeStatus`] into a status code.

use chrono::Utc;
use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::checks::{self, isolated, round2};
use super::datastore::Datastore;
use super::system::SystemSampler;
use super::types::{AggregateHealth, BasicHealth, DeepHealth, HealthSummary, ProbeStatus};
use crate::cache::CacheProvider;
use crate::config::HealthConfig;
use crate::constants::{checks as check_names, metric_names, SERVICE_VERSION};
use crate::error::{GatewayError, GatewayResult};
use crate::metrics::MetricsRegistry;
use crate::upstream::WeatherUpstream;

/// Collaborators the probes exercise
#[derive(Debug, Clone)]
pub struct HealthDependencies {
    pub cache: CacheProvider,
    pub datastore: Arc<dyn Datastore>,
    pub upstream: Arc<dyn WeatherUpstream>,
    pub sampler: Arc<dyn SystemSampler>,
    pub metrics: Arc<MetricsRegistry>,
}

#[derive(Debug)]
pub struct HealthService {
    deps: HealthDependencies,
    config: HealthConfig,
    environment: String,
    started_at: Instant,
    basic_memo: Mutex<Option<(Instant, BasicHealth)>>,
}

impl HealthService {
    pub fn new(deps: HealthDependencies, config: HealthConfig, environment: impl Into<String>) -> Self {
        Self {
            deps,
            config,
            environment: environment.into(),
            started_at: Instant::now(),
            basic_memo: Mutex::new(None),
        }
    }

    /// Override the process start instant (uptime-dependent tests)
    pub fn with_started_at(mut self, started_at: Instant) -> Self {
        self.started_at = started_at;
        self
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    fn filesystem_path(&self) -> PathBuf {
        PathBuf::from(&self.config.filesystem_path)
    }

    // =========================================================================
    // Endpoint-Level Methods
    // =========================================================================

    /// Basic health: GET /health
    ///
    /// Memoized for `basic_memo_seconds`. Never fails; a sampling error yields
    /// an `unhealthy` result describing it.
    pub async fn basic_health(&self) -> BasicHealth {
        self.deps.metrics.increment(metric_names::HEALTH_CHECKS_TOTAL);
        let _timer = self.deps.metrics.start_timer(metric_names::OP_HEALTH_CHECK);

        if let Some(cached) = self.memoized_basic() {
            return cached;
        }

        let computed = AssertUnwindSafe(self.compute_basic_health())
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(checks::panic_message(panic.as_ref())));

        match computed {
            Ok(health) => {
                *self.basic_memo.lock() = Some((Instant::now(), health.clone()));
                health
            }
            Err(reason) => {
                warn!(error = %reason, "Basic health check failed");
                let mut details = Map::new();
                details.insert("error".to_string(), Value::from(reason));
                BasicHealth {
                    status: ProbeStatus::Unhealthy,
                    message: "Application health check failed".to_string(),
                    uptime_seconds: self.uptime().as_secs(),
                    details,
                    timestamp: Utc::now(),
                }
            }
        }
    }

    fn memoized_basic(&self) -> Option<BasicHealth> {
        let memo = self.basic_memo.lock();
        memo.as_ref()
            .filter(|(at, _)| at.elapsed() < self.config.basic_memo())
            .map(|(_, health)| health.clone())
    }

    async fn compute_basic_health(&self) -> Result<BasicHealth, String> {
        let sampler = self.deps.sampler.as_ref();
        let memory = sampler.memory().await.map_err(|e| e.to_string())?;
        let disk = sampler
            .disk(&self.filesystem_path())
            .await
            .map_err(|e| e.to_string())?;
        let cpu = sampler.cpu_percent().await.map_err(|e| e.to_string())?;
        let load = sampler.load_average();
        let uptime_seconds = self.uptime().as_secs();

        let details = json!({
            "version": SERVICE_VERSION,
            "environment": self.environment,
            "uptime_seconds": uptime_seconds,
            "memory": {
                "used_mb": round2(memory.used_bytes as f64 / 1024.0 / 1024.0),
                "total_mb": round2(memory.total_bytes as f64 / 1024.0 / 1024.0),
                "usage_percent": round2(memory.percent()),
            },
            "disk": {
                "used_gb": round2(disk.used_bytes as f64 / 1024.0 / 1024.0 / 1024.0),
                "total_gb": round2(disk.total_bytes as f64 / 1024.0 / 1024.0 / 1024.0),
                "usage_percent": round2(disk.percent()),
            },
            "cpu_percent": round2(cpu),
            "load_average": [load.one, load.five, load.fifteen],
        });

        Ok(BasicHealth {
            status: ProbeStatus::Healthy,
            message: "All systems operational".to_string(),
            uptime_seconds,
            details: into_map(details),
            timestamp: Utc::now(),
        })
    }

    /// Kubernetes readiness probe: GET /ready
    ///
    /// Runs database, cache, memory, weather API and startup checks
    /// concurrently. Returns `Ok` iff all five pass; either way the response
    /// carries all five results.
    pub async fn readiness(&self) -> Result<AggregateHealth, AggregateHealth> {
        debug!("Performing readiness probe");
        let mut timer = self.deps.metrics.start_timer(metric_names::OP_READINESS_CHECK);
        let deps = &self.deps;

        let (database, cache, memory, weather_api) = futures::join!(
            isolated(check_names::DATABASE, checks::database(deps.datastore.as_ref(), &deps.metrics)),
            isolated(check_names::CACHE, checks::cache(&deps.cache, &deps.metrics)),
            isolated(
                check_names::MEMORY,
                checks::memory(deps.sampler.as_ref(), self.config.readiness_memory_percent)
            ),
            isolated(check_names::WEATHER_API, checks::weather_api(deps.upstream.as_ref(), &deps.metrics)),
        );
        let startup = checks::startup(self.uptime(), self.config.warmup());

        let response = AggregateHealth::from_checks(
            vec![database, cache, memory, weather_api, startup],
            (ProbeStatus::Ready, "Application ready to serve traffic"),
            (ProbeStatus::NotReady, "Application not ready for traffic"),
        );

        if response.all_passed() {
            Ok(response)
        } else {
            timer.mark_failed();
            Err(response)
        }
    }

    /// Kubernetes liveness probe: GET /live
    ///
    /// Depends only on memory and CPU, never on external services.
    pub async fn liveness(&self) -> Result<AggregateHealth, AggregateHealth> {
        let mut timer = self.deps.metrics.start_timer(metric_names::OP_LIVENESS_CHECK);
        let sampler = self.deps.sampler.as_ref();

        let (memory, cpu) = futures::join!(
            isolated(
                check_names::MEMORY,
                checks::memory(sampler, self.config.liveness_memory_percent)
            ),
            isolated(
                check_names::CPU,
                checks::cpu(sampler, self.config.liveness_cpu_percent)
            ),
        );

        let memory_percent = usage_percent(&memory);
        let cpu_percent = usage_percent(&cpu);
        let response = AggregateHealth::from_checks(
            vec![memory, cpu],
            (ProbeStatus::Alive, "Application is alive"),
            (ProbeStatus::Dead, "Application resource exhausted"),
        )
        .with_detail("pid", std::process::id())
        .with_detail("uptime_seconds", self.uptime().as_secs())
        .with_detail("memory_percent", memory_percent)
        .with_detail("cpu_percent", cpu_percent);
        let alive = response.all_passed();
        let response = response.with_detail("alive", alive);

        if alive {
            Ok(response)
        } else {
            timer.mark_failed();
            warn!(checks = ?response.checks, "Liveness probe failed");
            Err(response)
        }
    }

    /// External dependencies: GET /health/dependencies
    ///
    /// `healthy` when every dependency passes, `degraded` otherwise.
    pub async fn dependencies(&self) -> AggregateHealth {
        let mut timer = self
            .deps
            .metrics
            .start_timer(metric_names::OP_DEPENDENCIES_CHECK);
        let deps = &self.deps;
        let path = self.filesystem_path();

        let (database, cache, weather_api, filesystem) = futures::join!(
            isolated(check_names::DATABASE, checks::database(deps.datastore.as_ref(), &deps.metrics)),
            isolated(check_names::CACHE, checks::cache(&deps.cache, &deps.metrics)),
            isolated(check_names::WEATHER_API, checks::weather_api(deps.upstream.as_ref(), &deps.metrics)),
            isolated(
                check_names::FILESYSTEM,
                checks::filesystem(deps.sampler.as_ref(), &path, self.config.filesystem_percent)
            ),
        );

        let response = AggregateHealth::from_checks(
            vec![database, cache, weather_api, filesystem],
            (ProbeStatus::Healthy, "All dependencies healthy"),
            (ProbeStatus::Degraded, "Some dependencies unhealthy"),
        );
        if !response.all_passed() {
            timer.mark_failed();
        }
        response
    }

    /// Flat metrics mapping: GET /metrics
    pub async fn metrics_snapshot(&self) -> GatewayResult<BTreeMap<String, Value>> {
        guarded(self.collect_metrics()).await
    }

    async fn collect_metrics(&self) -> GatewayResult<BTreeMap<String, Value>> {
        let deps = &self.deps;
        let sampler = deps.sampler.as_ref();

        let memory = sampler
            .memory()
            .await
            .map_err(|e| GatewayError::internal(e.to_string()))?;
        let disk = sampler
            .disk(&self.filesystem_path())
            .await
            .map_err(|e| GatewayError::internal(e.to_string()))?;
        let cpu = sampler
            .cpu_percent()
            .await
            .map_err(|e| GatewayError::internal(e.to_string()))?;
        let load = sampler.load_average();

        let cache_started = Instant::now();
        let (db_ping, cache_ping, cache_entries, locations, recent) = futures::join!(
            deps.datastore.ping(),
            deps.cache.health_check(),
            deps.cache.entry_count(),
            deps.datastore.tracked_locations(),
            deps.datastore.requests_last_hour(),
        );
        let cache_elapsed = cache_started.elapsed();

        let mut out: BTreeMap<String, Value> = BTreeMap::new();
        let mut put = |key: &str, value: Value| {
            out.insert(key.to_string(), value);
        };

        put("application_uptime_seconds", json!(self.uptime().as_secs()));
        put("application_version", json!(SERVICE_VERSION));
        put("application_environment", json!(self.environment));

        put("system_memory_used_bytes", json!(memory.used_bytes));
        put("system_memory_total_bytes", json!(memory.total_bytes));
        put("system_memory_usage_percent", json!(round2(memory.percent())));
        put("system_disk_used_bytes", json!(disk.used_bytes));
        put("system_disk_total_bytes", json!(disk.total_bytes));
        put("system_disk_usage_percent", json!(round2(disk.percent())));
        put("system_cpu_usage_percent", json!(round2(cpu)));
        put("system_load_average_1m", json!(load.one));
        put("system_load_average_5m", json!(load.five));
        put("system_load_average_15m", json!(load.fifteen));

        match db_ping {
            Ok(elapsed) => {
                put("database_connection_status", json!(1));
                put(
                    "database_response_time_ms",
                    json!(round2(elapsed.as_secs_f64() * 1000.0)),
                );
            }
            Err(_) => {
                put("database_connection_status", json!(0));
                put("database_response_time_ms", json!(-1));
            }
        }

        match cache_ping {
            Ok(true) => {
                put("cache_connection_status", json!(1));
                put(
                    "cache_response_time_ms",
                    json!(round2(cache_elapsed.as_secs_f64() * 1000.0)),
                );
            }
            _ => {
                put("cache_connection_status", json!(0));
                put("cache_response_time_ms", json!(-1));
            }
        }

        put(
            "weather_api_key_configured",
            json!(u8::from(deps.upstream.is_configured())),
        );
        put(
            "weather_cache_entries",
            json!(cache_entries.map(|n| n as i64).unwrap_or(-1)),
        );
        put("weather_locations_tracked", json!(locations.unwrap_or(-1)));
        put("weather_requests_last_hour", json!(recent.unwrap_or(-1)));

        for (name, value) in deps.metrics.snapshot() {
            put(&name, json!(value));
        }
        put("timestamp", json!(Utc::now().to_rfc3339()));

        Ok(out)
    }

    /// Dashboard roll-up: GET /health/summary
    pub async fn summary(&self) -> GatewayResult<HealthSummary> {
        guarded(async {
            let basic = self.basic_health().await;
            let (readiness, dependencies) = futures::join!(self.readiness(), self.dependencies());

            Ok(HealthSummary {
                overall_status: basic.status,
                ready_for_traffic: readiness.is_ok(),
                dependencies_healthy: dependencies.status == ProbeStatus::Healthy,
                uptime_seconds: basic.uptime_seconds,
                health_endpoints: endpoint_directory(),
                timestamp: Utc::now(),
            })
        })
        .await
    }

    /// Every probe plus a metrics sample: GET /health/deep
    pub async fn deep(&self) -> GatewayResult<DeepHealth> {
        guarded(async {
            let basic_health = self.basic_health().await;
            let readiness = self.readiness().await.unwrap_or_else(|r| r);
            let liveness = self.liveness().await.unwrap_or_else(|r| r);
            let dependencies = self.dependencies().await;
            let metrics_sample = self.collect_metrics().await?;

            Ok(DeepHealth {
                basic_health,
                readiness,
                liveness,
                dependencies,
                metrics_sample,
                check_timestamp: Utc::now(),
            })
        })
        .await
    }
}

/// Probe endpoint paths, as advertised by the summary and the service index
pub fn endpoint_directory() -> Map<String, Value> {
    into_map(json!({
        "basic": "/health",
        "readiness": "/ready",
        "liveness": "/live",
        "dependencies": "/health/dependencies",
        "metrics": "/metrics",
    }))
}

fn usage_percent(result: &super::types::ProbeResult) -> Value {
    result.detail("usage_percent").cloned().unwrap_or(Value::Null)
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Convert a panic inside a composite probe into an internal error
async fn guarded<T, F>(fut: F) -> GatewayResult<T>
where
    F: Future<Output = GatewayResult<T>>,
{
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(GatewayError::internal(checks::panic_message(panic.as_ref()))))
}
