//! Drop-guard timer

use super::{errors_metric_name, MetricsRegistry};
use std::time::Instant;

/// Records elapsed time into the registry when dropped
///
/// The duration is written on every exit path, including early returns and
/// unwinding. Call [`mark_failed`](Self::mark_failed) to also count an error.
#[derive(Debug)]
#[must_use = "the duration is recorded when the timer is dropped"]
pub struct ScopedTimer<'a> {
    registry: &'a MetricsRegistry,
    operation: &'static str,
    started: Instant,
    failed: bool,
}

impl<'a> ScopedTimer<'a> {
    pub(super) fn new(registry: &'a MetricsRegistry, operation: &'static str) -> Self {
        Self {
            registry,
            operation,
            started: Instant::now(),
            failed: false,
        }
    }

    pub fn mark_failed(&mut self) {
        self.failed = true;
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        self.registry
            .record_duration(self.operation, self.started.elapsed());
        if self.failed {
            self.registry
                .increment(&errors_metric_name(self.operation));
        }
    }
}
