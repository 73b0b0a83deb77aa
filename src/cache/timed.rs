//! In-memory cache with per-entry expiration
//!
//! Expiry is checked lazily on every read against an injectable [`Clock`],
//! which lets tests move time forward without sleeping. An optional reaper
//! task physically removes expired entries; reads never depend on it.

use crate::cache::errors::CacheResult;
use crate::cache::traits::CacheService;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

/// Source of "now" for expiry comparisons
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> Instant;
}

/// Monotonic wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Shared in-memory key/value store with per-entry TTL
///
/// Cloning is cheap and every clone sees the same entries.
#[derive(Debug, Clone)]
pub struct TimedCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl Default for TimedCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TimedCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Fresh value for `key`, dropping the entry if it has expired
    pub fn get_fresh(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_fresh(now) {
                return Some(entry.value.clone());
            }
        }
        // Re-check under the shard write lock so a concurrent fresh write survives
        self.entries.remove_if(key, |_, entry| !entry.is_fresh(now));
        None
    }

    /// Store `value` under `key` for `ttl`, replacing any previous entry
    pub fn insert(&self, key: &str, value: &str, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );
    }

    pub fn exists_fresh(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .get(key)
            .is_some_and(|entry| entry.is_fresh(now))
    }

    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Physically remove every expired entry, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now));
        before.saturating_sub(self.entries.len())
    }

    /// Entries held, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run [`purge_expired`](Self::purge_expired) every `interval` until the handle is aborted
    pub fn spawn_reaper(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let purged = cache.purge_expired();
                if purged > 0 {
                    debug!(purged = purged, remaining = cache.len(), "Purged expired cache entries");
                }
            }
        })
    }
}

impl CacheService for TimedCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.get_fresh(key))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.insert(key, value, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    async fn entry_count(&self) -> CacheResult<u64> {
        Ok(self.len() as u64)
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
