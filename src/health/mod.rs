//! # Health Probes
//!
//! Kubernetes-compatible probes over the gateway's collaborators:
//!
//! | Probe | Checks | Verdict |
//! |---|---|---|
//! | readiness | database, cache, memory (< 85%), weather API, startup (>= 30s) | ready iff all pass |
//! | liveness | memory (< 95%), CPU (< 95%) | alive iff both pass |
//! | dependencies | database, cache, weather API, filesystem (< 90%) | healthy or degraded |
//!
//! Sub-checks run concurrently and never short-circuit, so every response
//! carries the full set of results.

pub mod checks;
pub mod datastore;
pub mod service;
pub mod system;
pub mod types;

pub use datastore::{Datastore, DatastoreError, PgDatastore};
pub use service::{HealthDependencies, HealthService};
pub use system::{DiskUsage, LoadAverage, MemoryUsage, SamplerError, SysinfoSampler, SystemSampler};
pub use types::{AggregateHealth, BasicHealth, CheckSummary, DeepHealth, HealthSummary, ProbeResult, ProbeStatus};
