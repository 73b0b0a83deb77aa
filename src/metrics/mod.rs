//! # Metrics Registry
//!
//! Process-wide counters and last-observation timers, shared by the gateway
//! and the health probes and exposed as one flat snapshot.
//!
//! Counters only ever increase. Timers are recorded as
//! `<operation>_duration_seconds` and hold the most recent observation, not
//! an aggregate. Construct one registry per process and hand out `Arc`s;
//! tests build a fresh registry per case.

mod timer;

pub use timer::ScopedTimer;

use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A single value in a metrics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Counter(u64),
    Seconds(f64),
}

/// Thread-safe counters and timers keyed by name
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    counters: DashMap<String, AtomicU64>,
    /// f64 bit patterns
    timers: DashMap<String, AtomicU64>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, name: &str) {
        self.increment_by(name, 1);
    }

    pub fn increment_by(&self, name: &str, amount: u64) {
        // Fast path avoids allocating the key once the counter exists
        if let Some(counter) = self.counters.get(name) {
            counter.fetch_add(amount, Ordering::Relaxed);
            return;
        }
        self.counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(amount, Ordering::Relaxed);
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Overwrite `<operation>_duration_seconds` with `elapsed`
    pub fn record_duration(&self, operation: &str, elapsed: Duration) {
        let bits = elapsed.as_secs_f64().to_bits();
        let name = duration_metric_name(operation);
        if let Some(timer) = self.timers.get(&name) {
            timer.store(bits, Ordering::Relaxed);
            return;
        }
        self.timers
            .entry(name)
            .or_insert_with(|| AtomicU64::new(0))
            .store(bits, Ordering::Relaxed);
    }

    /// Most recent duration recorded for `operation`, in seconds
    pub fn last_duration(&self, operation: &str) -> Option<f64> {
        self.timers
            .get(&duration_metric_name(operation))
            .map(|t| f64::from_bits(t.load(Ordering::Relaxed)))
    }

    /// Start timing `operation`; the duration is recorded when the guard drops
    pub fn start_timer(&self, operation: &'static str) -> ScopedTimer<'_> {
        ScopedTimer::new(self, operation)
    }

    /// Time a fallible future, counting `<operation>_errors_total` on `Err`
    pub async fn time<F, T, E>(&self, operation: &'static str, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let mut timer = self.start_timer(operation);
        let result = fut.await;
        if result.is_err() {
            timer.mark_failed();
        }
        result
    }

    /// Every counter and timer, sorted by name
    pub fn snapshot(&self) -> BTreeMap<String, MetricValue> {
        let mut snapshot: BTreeMap<String, MetricValue> = self
            .counters
            .iter()
            .map(|e| {
                (
                    e.key().clone(),
                    MetricValue::Counter(e.value().load(Ordering::Relaxed)),
                )
            })
            .collect();
        snapshot.extend(self.timers.iter().map(|e| {
            (
                e.key().clone(),
                MetricValue::Seconds(f64::from_bits(e.value().load(Ordering::Relaxed))),
            )
        }));
        snapshot
    }
}

pub fn duration_metric_name(operation: &str) -> String {
    format!("{operation}_duration_seconds")
}

pub fn errors_metric_name(operation: &str) -> String {
    format!("{operation}_errors_total")
}
