#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, OpenWeatherMap in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Weather Gateway
//!
//! HTTP gateway in front of a third-party weather provider, with a
//! cache-aside layer and Kubernetes-compatible health probes.
//!
//! ## Module Organization
//!
//! - [`cache`] - TTL cache, key builder and pluggable cache backends
//! - [`gateway`] - validation, cache-aside orchestration and payload reshaping
//! - [`upstream`] - OpenWeatherMap client
//! - [`health`] - readiness, liveness, dependency and metrics probes
//! - [`metrics`] - in-process counters and timers
//! - [`web`] - Axum routes and handlers
//! - [`config`] - layered TOML + environment configuration
//! - [`error`] - structured error handling
//!
//! ## Request Flow
//!
//! ```text
//! request -> validate -> QueryKey -> cache hit? -> response
//!                                       | miss
//!                                       v
//!                                  upstream -> reshape -> cache (TTL) -> response
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and integration tests
//! ```

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod upstream;
pub mod web;

pub use cache::{CacheKey, CacheProvider, QueryKey, TimedCache};
pub use config::{ConfigManager, GatewayConfig};
pub use error::{GatewayError, GatewayResult, UpstreamError};
pub use gateway::{ForecastDay, LocationMatch, WeatherGateway, WeatherSnapshot};
pub use health::{HealthService, ProbeResult, ProbeStatus};
pub use metrics::MetricsRegistry;
