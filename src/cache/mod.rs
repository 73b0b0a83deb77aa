//! # Response Cache
//!
//! Cache-aside storage for reshaped upstream responses.
//!
//! ## Architecture
//!
//! ```text
//! CacheProvider (enum)              <- dispatch, failures become misses
//!   ├── Memory(TimedCache)          <- in-process, per-entry expiry
//!   ├── Redis(RedisCacheService)    <- ConnectionManager-based async Redis
//!   └── NoOp(NoOpCacheService)      <- always-miss, always-succeed fallback
//! ```
//!
//! Every entry carries its own TTL chosen by the caller. Expired entries are
//! never returned, whether or not they have been physically removed yet.
//! Keys come from [`QueryKey::build`], which is deterministic across restarts.

pub mod errors;
pub mod key;
pub mod provider;
pub mod providers;
pub mod timed;
pub mod traits;

pub use errors::{CacheError, CacheResult};
pub use key::{CacheKey, QueryKey};
pub use provider::CacheProvider;
pub use providers::NoOpCacheService;
pub use timed::{Clock, ManualClock, SystemClock, TimedCache};
pub use traits::CacheService;

#[cfg(feature = "cache-redis")]
pub use providers::RedisCacheService;
