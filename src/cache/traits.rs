//! Backend contract shared by the memory, Redis and no-op stores

use super::errors::CacheResult;
use std::future::Future;
use std::time::Duration;

/// A string key/value store with per-entry expiry
///
/// Values are serialized response records; the gateway never stores anything
/// else. A read must never return an entry past its TTL.
pub trait CacheService: Send + Sync {
    /// `Ok(None)` on a miss or an expired entry
    fn get(&self, key: &str) -> impl Future<Output = CacheResult<Option<String>>> + Send;

    /// Replace any existing entry; `ttl` restarts from now
    fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl Future<Output = CacheResult<()>> + Send;

    fn delete(&self, key: &str) -> impl Future<Output = CacheResult<()>> + Send;

    /// Round-trip the store; `Ok(false)` when it answered but not as expected
    fn health_check(&self) -> impl Future<Output = CacheResult<bool>> + Send;

    fn entry_count(&self) -> impl Future<Output = CacheResult<u64>> + Send;

    fn provider_name(&self) -> &'static str;
}
