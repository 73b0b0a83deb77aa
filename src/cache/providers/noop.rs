//! Store that holds nothing
//!
//! Selected by `cache.backend = "none"`, and substituted for Redis when the
//! configured server cannot be reached at startup.

use crate::cache::errors::CacheResult;
use crate::cache::traits::CacheService;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCacheService;

impl NoOpCacheService {
    pub fn new() -> Self {
        Self
    }
}

impl CacheService for NoOpCacheService {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    async fn entry_count(&self) -> CacheResult<u64> {
        Ok(0)
    }

    fn provider_name(&self) -> &'static str {
        "noop"
    }
}
