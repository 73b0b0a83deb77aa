//! Redis-backed response store (`cache-redis` feature)
//!
//! Expiry is delegated to Redis through `SETEX`, so `GET` never returns a
//! stale response record.

use crate::cache::errors::{CacheError, CacheResult};
use crate::cache::traits::CacheService;
use crate::config::redact_url;
use std::time::Duration;
use tracing::debug;

/// Give up on the initial connection after this long
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Clone)]
pub struct RedisCacheService {
    connection_manager: redis::aio::ConnectionManager,
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("connection_manager", &"ConnectionManager")
            .finish()
    }
}

impl RedisCacheService {
    /// Connect to `url`, failing fast if the server does not answer
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::ConnectionError(format!("invalid Redis URL: {e}")))?;

        let connection_manager =
            tokio::time::timeout(CONNECT_TIMEOUT, redis::aio::ConnectionManager::new(client))
                .await
                .map_err(|_| CacheError::Timeout(CONNECT_TIMEOUT))?
                .map_err(|e| CacheError::ConnectionError(e.to_string()))?;

        debug!(url = %redact_url(url), "Redis cache service connected");

        Ok(Self { connection_manager })
    }
}

impl CacheService for RedisCacheService {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection_manager.clone();
        let result: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("GET: {e}")))?;

        Ok(result)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();
        let ttl_seconds = ttl.as_secs().max(1);

        redis::cmd("SETEX")
            .arg(key)
            .arg(ttl_seconds)
            .arg(value)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("SETEX: {e}")))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();

        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("DEL: {e}")))?;

        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        let mut conn = self.connection_manager.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("PING: {e}")))?;

        Ok(pong == "PONG")
    }

    async fn entry_count(&self) -> CacheResult<u64> {
        let mut conn = self.connection_manager.clone();
        redis::cmd("DBSIZE")
            .query_async::<u64>(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("DBSIZE: {e}")))
    }

    fn provider_name(&self) -> &'static str {
        "redis"
    }
}
