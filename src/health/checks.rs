//! Individual probe checks
//!
//! Each check returns a [`ProbeResult`] whatever happens; dependency failures
//! are rendered into the result. [`isolated`] additionally turns a panicking
//! check into an unhealthy result so sibling checks still report.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use super::datastore::{Datastore, DatastoreError};
use super::system::{DiskUsage, MemoryUsage, SystemSampler};
use super::types::ProbeResult;
use crate::cache::CacheProvider;
use crate::constants::{checks, metric_names};
use crate::error::UpstreamError;
use crate::metrics::MetricsRegistry;
use crate::upstream::WeatherUpstream;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Run a check, converting a panic into an unhealthy result
pub async fn isolated<F>(name: &'static str, check: F) -> ProbeResult
where
    F: Future<Output = ProbeResult>,
{
    match AssertUnwindSafe(check).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let reason = panic_message(panic.as_ref());
            warn!(check = name, error = %reason, "Health check panicked");
            ProbeResult::unhealthy(name, "Check failed unexpectedly").with_detail("error", reason)
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn millis(elapsed: Duration) -> f64 {
    round2(elapsed.as_secs_f64() * 1000.0)
}

pub async fn database(datastore: &dyn Datastore, metrics: &MetricsRegistry) -> ProbeResult {
    metrics.increment(metric_names::DATABASE_CHECKS_TOTAL);
    match datastore.ping().await {
        Ok(elapsed) => ProbeResult::healthy(checks::DATABASE, "Database connection successful")
            .with_detail("response_time_ms", millis(elapsed))
            .with_detail("database", datastore.describe()),
        Err(DatastoreError::NotConfigured) => {
            ProbeResult::unhealthy(checks::DATABASE, "Database not configured")
                .with_detail("error", "database URL missing")
        }
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            ProbeResult::unhealthy(checks::DATABASE, "Database connection failed")
                .with_detail("error", e.to_string())
        }
    }
}

pub async fn cache(cache: &CacheProvider, metrics: &MetricsRegistry) -> ProbeResult {
    metrics.increment(metric_names::CACHE_CHECKS_TOTAL);
    let started = std::time::Instant::now();
    match cache.health_check().await {
        Ok(true) => ProbeResult::healthy(checks::CACHE, "Cache store reachable")
            .with_detail("provider", cache.provider_name())
            .with_detail("response_time_ms", millis(started.elapsed())),
        Ok(false) => ProbeResult::unhealthy(checks::CACHE, "Cache store did not acknowledge ping")
            .with_detail("provider", cache.provider_name()),
        Err(e) => {
            warn!(error = %e, "Cache health check failed");
            ProbeResult::unhealthy(checks::CACHE, "Cache store unreachable")
                .with_detail("provider", cache.provider_name())
                .with_detail("error", e.to_string())
        }
    }
}

pub async fn weather_api(upstream: &dyn WeatherUpstream, metrics: &MetricsRegistry) -> ProbeResult {
    metrics.increment(metric_names::API_CHECKS_TOTAL);
    match upstream.probe().await {
        Ok(response) => {
            let result = if response.is_success() {
                ProbeResult::healthy(checks::WEATHER_API, "Weather API accessible")
            } else {
                ProbeResult::unhealthy(checks::WEATHER_API, "Weather API not accessible")
            };
            result
                .with_detail("response_time_ms", millis(response.elapsed))
                .with_detail("status_code", response.status_code)
                .with_detail("api_endpoint", upstream.endpoint())
        }
        Err(UpstreamError::NotConfigured) => {
            ProbeResult::unhealthy(checks::WEATHER_API, "Weather API key not configured")
                .with_detail("error", "API key missing")
        }
        Err(e) => {
            warn!(error = %e, "Weather API health check failed");
            ProbeResult::unhealthy(checks::WEATHER_API, "Weather API check failed")
                .with_detail("error", e.to_string())
        }
    }
}

/// Healthy iff `usage_percent < threshold_percent`
pub fn memory_verdict(name: &str, usage: MemoryUsage, threshold_percent: f64) -> ProbeResult {
    let percent = usage.percent();
    let result = if percent < threshold_percent {
        ProbeResult::healthy(name, "Memory usage within limits")
    } else {
        ProbeResult::unhealthy(name, "Memory usage too high")
    };
    result
        .with_detail("used_mb", round2(usage.used_bytes as f64 / BYTES_PER_MB))
        .with_detail("total_mb", round2(usage.total_bytes as f64 / BYTES_PER_MB))
        .with_detail("usage_percent", round2(percent))
        .with_detail("threshold_percent", threshold_percent)
}

pub async fn memory(sampler: &dyn SystemSampler, threshold_percent: f64) -> ProbeResult {
    match sampler.memory().await {
        Ok(usage) => memory_verdict(checks::MEMORY, usage, threshold_percent),
        Err(e) => ProbeResult::unhealthy(checks::MEMORY, "Memory check failed")
            .with_detail("error", e.to_string()),
    }
}

/// Healthy iff `cpu_percent < threshold_percent`
pub fn cpu_verdict(cpu_percent: f64, threshold_percent: f64) -> ProbeResult {
    let result = if cpu_percent < threshold_percent {
        ProbeResult::healthy(checks::CPU, "CPU usage within limits")
    } else {
        ProbeResult::unhealthy(checks::CPU, "CPU usage too high")
    };
    result
        .with_detail("usage_percent", round2(cpu_percent))
        .with_detail("threshold_percent", threshold_percent)
}

pub async fn cpu(sampler: &dyn SystemSampler, threshold_percent: f64) -> ProbeResult {
    match sampler.cpu_percent().await {
        Ok(percent) => cpu_verdict(percent, threshold_percent),
        Err(e) => ProbeResult::unhealthy(checks::CPU, "CPU check failed")
            .with_detail("error", e.to_string()),
    }
}

/// Healthy iff `usage_percent < threshold_percent`
pub fn filesystem_verdict(usage: DiskUsage, threshold_percent: f64) -> ProbeResult {
    let percent = usage.percent();
    let result = if percent < threshold_percent {
        ProbeResult::healthy(checks::FILESYSTEM, "File system space sufficient")
    } else {
        ProbeResult::unhealthy(checks::FILESYSTEM, "File system space low")
    };
    result
        .with_detail("used_gb", round2(usage.used_bytes as f64 / BYTES_PER_GB))
        .with_detail("total_gb", round2(usage.total_bytes as f64 / BYTES_PER_GB))
        .with_detail("usage_percent", round2(percent))
        .with_detail("threshold_percent", threshold_percent)
}

pub async fn filesystem(
    sampler: &dyn SystemSampler,
    path: &Path,
    threshold_percent: f64,
) -> ProbeResult {
    match sampler.disk(path).await {
        Ok(usage) => filesystem_verdict(usage, threshold_percent),
        Err(e) => ProbeResult::unhealthy(checks::FILESYSTEM, "File system check failed")
            .with_detail("error", e.to_string()),
    }
}

/// Ready once `uptime >= warmup`
pub fn startup(uptime: Duration, warmup: Duration) -> ProbeResult {
    let complete = uptime >= warmup;
    let result = if complete {
        ProbeResult::healthy(checks::STARTUP, "Application warmup complete")
    } else {
        ProbeResult::unhealthy(checks::STARTUP, "Application still warming up")
    };
    result
        .with_detail("uptime_seconds", uptime.as_secs())
        .with_detail("warmup_threshold", warmup.as_secs())
        .with_detail("warmup_complete", complete)
}
