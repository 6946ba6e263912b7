//! Metrics Module
//!
//! Operation latency tracking, per-category cache counters and reports.

mod counters;
mod report;
mod timer;
mod tracker;

pub use counters::CategoryCounters;
pub use report::{MetricsReport, OperationMetrics, METRICS_REPORT_KEY};
pub use timer::OperationTimer;
pub use tracker::{PerformanceTracker, DEFAULT_SLOW_THRESHOLD};

// == Operation Names ==
pub const OP_CACHE_GET: &str = "cache_get";
pub const OP_CACHE_SET: &str = "cache_set";
pub const OP_CACHE_MAINTENANCE: &str = "cache_maintenance";
