//! # System Constants
//!
//! Default TTLs, probe thresholds, validation bounds and metric names that
//! define the operational boundaries of the gateway. Configuration defaults
//! in [`crate::config`] are built from these values.

/// Cache expiration policies, keyed by how volatile the upstream data is
pub mod ttl {
    /// Current conditions change quickly
    pub const CURRENT_CONDITIONS_SECONDS: u64 = 300;
    pub const FORECAST_SECONDS: u64 = 3600;
    pub const LOCATION_SEARCH_SECONDS: u64 = 3600;
}

/// Request validation bounds
pub mod limits {
    pub const MIN_LATITUDE: f64 = -90.0;
    pub const MAX_LATITUDE: f64 = 90.0;
    pub const MIN_LONGITUDE: f64 = -180.0;
    pub const MAX_LONGITUDE: f64 = 180.0;

    pub const MIN_FORECAST_DAYS: u32 = 1;
    pub const MAX_FORECAST_DAYS: u32 = 7;
    pub const DEFAULT_FORECAST_DAYS: u32 = 5;

    pub const MIN_SEARCH_QUERY_CHARS: usize = 2;
    pub const MIN_SEARCH_LIMIT: u32 = 1;
    pub const MAX_SEARCH_LIMIT: u32 = 20;
    pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

    /// Decimal places kept for coordinates in cache keys (upstream coordinate granularity)
    pub const COORDINATE_KEY_PRECISION: usize = 4;
}

/// Probe thresholds (percent used / seconds)
pub mod thresholds {
    pub const READINESS_MEMORY_PERCENT: f64 = 85.0;
    pub const LIVENESS_MEMORY_PERCENT: f64 = 95.0;
    pub const LIVENESS_CPU_PERCENT: f64 = 95.0;
    pub const FILESYSTEM_PERCENT: f64 = 90.0;
    pub const WARMUP_SECONDS: u64 = 30;
    pub const BASIC_HEALTH_MEMO_SECONDS: u64 = 5;
}

/// Names of the registry counters and timers
pub mod metric_names {
    pub const HEALTH_CHECKS_TOTAL: &str = "health_checks_total";
    pub const DATABASE_CHECKS_TOTAL: &str = "database_checks_total";
    pub const CACHE_CHECKS_TOTAL: &str = "cache_checks_total";
    pub const API_CHECKS_TOTAL: &str = "api_checks_total";
    pub const WEATHER_REQUESTS_TOTAL: &str = "weather_requests_total";
    pub const WEATHER_API_ERRORS_TOTAL: &str = "weather_api_errors_total";
    pub const WEATHER_CACHE_HITS_TOTAL: &str = "weather_cache_hits_total";
    pub const WEATHER_CACHE_MISSES_TOTAL: &str = "weather_cache_misses_total";

    // Timed operations, recorded as `<op>_duration_seconds`
    pub const OP_HEALTH_CHECK: &str = "health_check";
    pub const OP_READINESS_CHECK: &str = "readiness_check";
    pub const OP_LIVENESS_CHECK: &str = "liveness_check";
    pub const OP_DEPENDENCIES_CHECK: &str = "dependencies_check";
    pub const OP_CURRENT_WEATHER_FETCH: &str = "current_weather_fetch";
    pub const OP_FORECAST_FETCH: &str = "forecast_fetch";
    pub const OP_LOCATION_SEARCH_FETCH: &str = "location_search_fetch";
}

/// Names of the individual probe checks as reported in `ProbeResult::name`
pub mod checks {
    pub const DATABASE: &str = "database";
    pub const CACHE: &str = "cache";
    pub const MEMORY: &str = "memory";
    pub const CPU: &str = "cpu";
    pub const WEATHER_API: &str = "weather_api";
    pub const STARTUP: &str = "startup";
    pub const FILESYSTEM: &str = "filesystem";
}

pub const SERVICE_NAME: &str = "weather-gateway";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
