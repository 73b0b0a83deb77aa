//! Error types for the weather gateway.

use std::time::Duration;
use thiserror::Error;

/// Top-level error surfaced by gateway operations.
///
/// Validation failures are rejected before any cache or network I/O.
/// Upstream failures are never cached and never replaced with a fallback value.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Failures talking to the upstream weather/geocoding provider.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Weather API key not configured")]
    NotConfigured,
    #[error("Upstream unreachable: {0}")]
    Unreachable(String),
    #[error("Upstream request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed upstream payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            UpstreamError::Malformed(error.to_string())
        } else {
            UpstreamError::Unreachable(error.to_string())
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
