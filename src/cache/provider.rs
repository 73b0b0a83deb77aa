//! Cache provider with graceful degradation
//!
//! Enum dispatch over the configured backend. Consumers never see a cache
//! error on the data path: failed reads are misses, failed writes are logged
//! and dropped. Only [`CacheProvider::health_check`] and
//! [`CacheProvider::entry_count`] surface errors, for the probes.

use super::errors::{CacheError, CacheResult};
use super::providers::NoOpCacheService;
use super::timed::TimedCache;
use super::traits::CacheService;
use crate::config::CacheConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

#[cfg(feature = "cache-redis")]
use super::providers::RedisCacheService;

#[derive(Debug, Clone)]
enum CacheBackend {
    Memory(TimedCache),

    /// Boxed to keep the enum small
    #[cfg(feature = "cache-redis")]
    Redis(Box<RedisCacheService>),

    NoOp(NoOpCacheService),
}

impl CacheBackend {
    fn provider_name(&self) -> &'static str {
        match self {
            Self::Memory(s) => s.provider_name(),
            #[cfg(feature = "cache-redis")]
            Self::Redis(s) => s.provider_name(),
            Self::NoOp(s) => s.provider_name(),
        }
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match self {
            Self::Memory(s) => s.get(key).await,
            #[cfg(feature = "cache-redis")]
            Self::Redis(s) => s.get(key).await,
            Self::NoOp(s) => s.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        match self {
            Self::Memory(s) => s.set(key, value, ttl).await,
            #[cfg(feature = "cache-redis")]
            Self::Redis(s) => s.set(key, value, ttl).await,
            Self::NoOp(s) => s.set(key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        match self {
            Self::Memory(s) => s.delete(key).await,
            #[cfg(feature = "cache-redis")]
            Self::Redis(s) => s.delete(key).await,
            Self::NoOp(s) => s.delete(key).await,
        }
    }

    async fn health_check(&self) -> CacheResult<bool> {
        match self {
            Self::Memory(s) => s.health_check().await,
            #[cfg(feature = "cache-redis")]
            Self::Redis(s) => s.health_check().await,
            Self::NoOp(s) => s.health_check().await,
        }
    }

    async fn entry_count(&self) -> CacheResult<u64> {
        match self {
            Self::Memory(s) => s.entry_count().await,
            #[cfg(feature = "cache-redis")]
            Self::Redis(s) => s.entry_count().await,
            Self::NoOp(s) => s.entry_count().await,
        }
    }
}

/// Unified cache handle used by the gateway and the probes
#[derive(Debug, Clone)]
pub struct CacheProvider {
    backend: CacheBackend,
    /// Set when the configured backend could not be created and NoOp stands in
    degraded_from: Option<String>,
}

impl CacheProvider {
    /// Create a cache provider from configuration with graceful degradation
    ///
    /// An unreachable Redis logs a warning and yields a NoOp provider that
    /// reports itself unhealthy. Startup never fails because of the cache.
    pub async fn from_config_graceful(config: &CacheConfig) -> Self {
        match config.backend.as_str() {
            "memory" => {
                info!(backend = "memory", "In-memory cache provider initialized");
                Self::memory(TimedCache::new())
            }
            "redis" => Self::create_redis(config).await,
            "none" => {
                info!("Response cache disabled by configuration");
                Self::noop()
            }
            other => {
                warn!(backend = other, "Unknown cache backend, falling back to NoOp");
                Self::degraded(other)
            }
        }
    }

    #[cfg(feature = "cache-redis")]
    async fn create_redis(config: &CacheConfig) -> Self {
        let Some(url) = config.redis_url.as_deref() else {
            warn!("Redis cache selected but no redis_url configured, falling back to NoOp");
            return Self::degraded("redis");
        };

        match RedisCacheService::connect(url).await {
            Ok(service) => {
                info!(backend = "redis", "Redis cache provider initialized");
                Self {
                    backend: CacheBackend::Redis(Box::new(service)),
                    degraded_from: None,
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Failed to connect to Redis, falling back to NoOp cache"
                );
                Self::degraded("redis")
            }
        }
    }

    #[cfg(not(feature = "cache-redis"))]
    async fn create_redis(_config: &CacheConfig) -> Self {
        warn!("Redis cache backend requested but 'cache-redis' feature not enabled, using NoOp");
        Self::degraded("redis")
    }

    /// In-memory provider over an existing store
    pub fn memory(cache: TimedCache) -> Self {
        Self {
            backend: CacheBackend::Memory(cache),
            degraded_from: None,
        }
    }

    /// Create a NoOp provider (explicit opt-out or testing)
    pub fn noop() -> Self {
        Self {
            backend: CacheBackend::NoOp(NoOpCacheService::new()),
            degraded_from: None,
        }
    }

    fn degraded(requested: &str) -> Self {
        Self {
            backend: CacheBackend::NoOp(NoOpCacheService::new()),
            degraded_from: Some(requested.to_string()),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.backend.provider_name()
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self.backend, CacheBackend::NoOp(_))
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded_from.is_some()
    }

    /// The in-memory store, when that is the active backend
    pub fn timed_cache(&self) -> Option<&TimedCache> {
        match &self.backend {
            CacheBackend::Memory(cache) => Some(cache),
            _ => None,
        }
    }

    /// Raw read; backend failures are logged and reported as a miss
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.backend.get(key).await {
            Ok(Some(value)) => {
                debug!(key = key, "Cache HIT");
                Some(value)
            }
            Ok(None) => {
                debug!(key = key, "Cache MISS");
                None
            }
            Err(e) => {
                warn!(key = key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Raw write; backend failures are logged and swallowed
    pub async fn set(&self, key: &str, value: &str, ttl: Duration) {
        match self.backend.set(key, value, ttl).await {
            Ok(()) => debug!(key = key, ttl_seconds = ttl.as_secs(), "Cache SET"),
            Err(e) => warn!(key = key, error = %e, "Cache write failed, continuing uncached"),
        }
    }

    pub async fn delete(&self, key: &str) {
        if let Err(e) = self.backend.delete(key).await {
            warn!(key = key, error = %e, "Cache delete failed");
        }
    }

    /// Typed read; an undecodable entry is a miss and is evicted
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match decode::<T>(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = key, error = %e, "Evicting undecodable cache entry");
                self.delete(key).await;
                None
            }
        }
    }

    /// Typed write
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match encode(value) {
            Ok(raw) => self.set(key, &raw, ttl).await,
            Err(e) => warn!(key = key, error = %e, "Cache value not serializable, skipping"),
        }
    }

    /// Round-trip the backend
    ///
    /// A provider that fell back to NoOp reports the original backend as unreachable.
    pub async fn health_check(&self) -> CacheResult<bool> {
        if let Some(requested) = &self.degraded_from {
            return Err(CacheError::ConnectionError(format!(
                "{requested} cache backend unavailable, running without cache"
            )));
        }
        self.backend.health_check().await
    }

    pub async fn entry_count(&self) -> CacheResult<u64> {
        self.backend.entry_count().await
    }
}

fn decode<T: DeserializeOwned>(raw: &str) -> CacheResult<T> {
    Ok(serde_json::from_str(raw)?)
}

fn encode<T: Serialize>(value: &T) -> CacheResult<String> {
    Ok(serde_json::to_string(value)?)
}
