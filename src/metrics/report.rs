//! Metrics Report Module
//!
//! Aggregated view of recorded operation durations, as persisted to the
//! key-value store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Category;
use crate::metrics::CategoryCounters;

/// Key under which the latest report is persisted.
pub const METRICS_REPORT_KEY: &str = "performance_metrics";

// == Operation Metrics ==
/// Latency summary for one operation name. Durations are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationMetrics {
    pub operation: String,
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

impl OperationMetrics {
    /// Summarizes `durations`. Returns None for an empty sequence.
    pub fn from_durations(operation: &str, durations: &[f64]) -> Option<Self> {
        if durations.is_empty() {
            return None;
        }

        let sum: f64 = durations.iter().sum();
        let min = durations.iter().copied().fold(f64::INFINITY, f64::min);
        let max = durations.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            operation: operation.to_string(),
            count: durations.len(),
            average: sum / durations.len() as f64,
            min,
            max,
        })
    }
}

// == Metrics Report ==
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub generated_at: DateTime<Utc>,
    /// One summary per operation with at least one observation, ordered by name
    pub operations: Vec<OperationMetrics>,
    /// Hit/miss/set totals per category
    pub categories: BTreeMap<Category, CategoryCounters>,
}

impl MetricsReport {
    /// Looks up the summary for `operation`.
    pub fn operation(&self, operation: &str) -> Option<&OperationMetrics> {
        self.operations.iter().find(|m| m.operation == operation)
    }
}
