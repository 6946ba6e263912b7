//! Scope timer that reports its lifetime to a [`PerformanceTracker`].

use tokio::time::Instant;

use crate::metrics::PerformanceTracker;

/// Records the elapsed time under `operation` when dropped, so every exit
/// path of the enclosing scope is measured, including `?` returns.
#[must_use = "the timer records when dropped; binding it to `_` drops it immediately"]
#[derive(Debug)]
pub struct OperationTimer<'a> {
    tracker: &'a PerformanceTracker,
    operation: &'static str,
    started: Instant,
}

impl<'a> OperationTimer<'a> {
    pub fn new(tracker: &'a PerformanceTracker, operation: &'static str) -> Self {
        Self {
            tracker,
            operation,
            started: Instant::now(),
        }
    }
}

impl Drop for OperationTimer<'_> {
    fn drop(&mut self) {
        self.tracker.track(self.operation, self.started);
    }
}
