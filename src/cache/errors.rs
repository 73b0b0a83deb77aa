//! Failures inside a cache backend
//!
//! These never reach a caller of the gateway: [`CacheProvider`](super::CacheProvider)
//! turns them into misses or dropped writes.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store unreachable: {0}")]
    ConnectionError(String),

    /// Stored bytes did not decode as the expected response record
    #[error("cached value could not be (de)serialized: {0}")]
    SerializationError(String),

    #[error("cache store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("cache store rejected command: {0}")]
    BackendError(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        Self::SerializationError(error.to_string())
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
