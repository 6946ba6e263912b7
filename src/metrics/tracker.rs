//! Performance Tracker Module
//!
//! Records operation latencies and per-category cache counters, and turns
//! them into persisted reports.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::Category;
use crate::error::StorageResult;
use crate::metrics::{
    CategoryCounters, MetricsReport, OperationMetrics, OperationTimer, METRICS_REPORT_KEY,
};
use crate::storage::KeyValueStore;

/// Default slow-operation threshold.
pub const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_millis(1000);

// == Performance Tracker ==
/// Shared latency and counter bookkeeping.
///
/// Internal locks are held only for the duration of a push or a snapshot,
/// never across an await point.
#[derive(Debug)]
pub struct PerformanceTracker {
    slow_threshold: Duration,
    /// Observed durations in milliseconds, per operation name, append-only
    durations: Mutex<BTreeMap<String, Vec<f64>>>,
    counters: Mutex<BTreeMap<Category, CategoryCounters>>,
}

impl PerformanceTracker {
    // == Constructor ==
    pub fn new(slow_threshold: Duration) -> Self {
        let counters = Category::ALL
            .iter()
            .map(|category| (*category, CategoryCounters::new()))
            .collect();

        Self {
            slow_threshold,
            durations: Mutex::new(BTreeMap::new()),
            counters: Mutex::new(counters),
        }
    }

    pub fn slow_threshold(&self) -> Duration {
        self.slow_threshold
    }

    // == Track ==
    /// Records the time elapsed since `started` under `operation` and
    /// returns it.
    pub fn track(&self, operation: &str, started: Instant) -> Duration {
        let elapsed = started.elapsed();
        self.record(operation, elapsed);
        elapsed
    }

    // == Record ==
    /// Appends an observed duration. Logs a warning when it exceeds the
    /// slow-operation threshold.
    pub fn record(&self, operation: &str, elapsed: Duration) {
        if elapsed > self.slow_threshold {
            warn!(
                operation,
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = self.slow_threshold.as_millis() as u64,
                "Slow operation detected"
            );
        }

        let millis = elapsed.as_nanos() as f64 / 1_000_000.0;
        lock(&self.durations)
            .entry(operation.to_string())
            .or_default()
            .push(millis);
    }

    /// Starts a scope timer that records under `operation` when dropped.
    pub fn timer(&self, operation: &'static str) -> OperationTimer<'_> {
        OperationTimer::new(self, operation)
    }

    // == Counters ==
    pub fn record_hit(&self, category: Category) {
        self.with_counters(category, CategoryCounters::record_hit);
    }

    pub fn record_miss(&self, category: Category) {
        self.with_counters(category, CategoryCounters::record_miss);
    }

    pub fn record_set(&self, category: Category) {
        self.with_counters(category, CategoryCounters::record_set);
    }

    fn with_counters(&self, category: Category, update: impl FnOnce(&mut CategoryCounters)) {
        update(lock(&self.counters).entry(category).or_default());
    }

    /// Snapshot of the per-category counters.
    pub fn counters(&self) -> BTreeMap<Category, CategoryCounters> {
        lock(&self.counters).clone()
    }

    /// Number of observations recorded for `operation`.
    pub fn observation_count(&self, operation: &str) -> usize {
        lock(&self.durations).get(operation).map_or(0, Vec::len)
    }

    // == Reports ==
    /// Aggregates everything recorded so far. Operations without
    /// observations are left out.
    pub fn generate_report(&self) -> MetricsReport {
        let operations = lock(&self.durations)
            .iter()
            .filter_map(|(name, durations)| OperationMetrics::from_durations(name, durations))
            .collect();

        MetricsReport {
            generated_at: Utc::now(),
            operations,
            categories: self.counters(),
        }
    }

    /// Generates a report and persists it under `performance_metrics`,
    /// overwriting the previous one.
    pub async fn report_metrics<S>(&self, store: &S) -> StorageResult<MetricsReport>
    where
        S: KeyValueStore + ?Sized,
    {
        let report = self.generate_report();
        let value = serde_json::to_value(&report)?;
        store.set(METRICS_REPORT_KEY, value).await?;

        debug!(
            operations = report.operations.len(),
            "Performance metrics report persisted"
        );
        Ok(report)
    }
}

impl Default for PerformanceTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SLOW_THRESHOLD)
    }
}

/// Recording must never fail, so a poisoned lock is recovered rather than
/// propagated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use serde_json::Value;

    #[test]
    fn test_aggregation_over_full_sequence() {
        let tracker = PerformanceTracker::default();
        tracker.record("x", Duration::from_millis(100));
        tracker.record("x", Duration::from_millis(300));
        tracker.record("x", Duration::from_millis(200));

        let report = tracker.generate_report();
        let x = report.operation("x").unwrap();
        assert_eq!(x.count, 3);
        assert_eq!(x.average, 200.0);
        assert_eq!(x.min, 100.0);
        assert_eq!(x.max, 300.0);
    }

    #[test]
    fn test_report_orders_operations_by_name() {
        let tracker = PerformanceTracker::default();
        tracker.record("cache_set", Duration::from_millis(1));
        tracker.record("cache_get", Duration::from_millis(1));

        let names: Vec<_> = tracker
            .generate_report()
            .operations
            .into_iter()
            .map(|m| m.operation)
            .collect();
        assert_eq!(names, vec!["cache_get", "cache_set"]);
    }

    #[test]
    fn test_untracked_operation_absent_from_report() {
        let tracker = PerformanceTracker::default();
        assert!(tracker.generate_report().operations.is_empty());
        assert!(tracker.generate_report().operation("cache_get").is_none());
    }

    #[test]
    fn test_counters_per_category() {
        let tracker = PerformanceTracker::default();
        tracker.record_hit(Category::Product);
        tracker.record_miss(Category::Product);
        tracker.record_set(Category::Seller);

        let counters = tracker.counters();
        assert_eq!(counters[&Category::Product].hits, 1);
        assert_eq!(counters[&Category::Product].misses, 1);
        assert_eq!(counters[&Category::Seller].sets, 1);
        assert_eq!(counters[&Category::PriceHistory], CategoryCounters::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_track_measures_elapsed() {
        let tracker = PerformanceTracker::default();
        let started = Instant::now();
        tokio::time::sleep(Duration::from_millis(250)).await;

        let elapsed = tracker.track("wait", started);
        assert!(elapsed >= Duration::from_millis(250));
        assert_eq!(tracker.observation_count("wait"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_records_on_drop() {
        let tracker = PerformanceTracker::default();
        {
            let _timer = tracker.timer("scoped");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(tracker.observation_count("scoped"), 1);
    }

    #[tokio::test]
    async fn test_report_metrics_persists_report() {
        let tracker = PerformanceTracker::default();
        let store = MemoryStore::new();
        tracker.record("cache_get", Duration::from_millis(10));

        tracker.report_metrics(&store).await.unwrap();

        let stored = store.get(METRICS_REPORT_KEY).await.unwrap().unwrap();
        assert_eq!(stored["operations"][0]["operation"], "cache_get");
        assert_eq!(stored["operations"][0]["count"], 1);
    }

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> StorageResult<Option<Value>> {
            Err(StorageError::Backend("unavailable".to_string()))
        }

        async fn set(&self, _key: &str, _value: Value) -> StorageResult<()> {
            Err(StorageError::Backend("quota exceeded".to_string()))
        }

        async fn remove(&self, _key: &str) -> StorageResult<()> {
            Err(StorageError::Backend("unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_report_metrics_propagates_storage_failure() {
        let tracker = PerformanceTracker::default();
        tracker.record("cache_get", Duration::from_millis(10));

        let result = tracker.report_metrics(&BrokenStore).await;
        assert!(matches!(result, Err(StorageError::Backend(_))));
    }
}
