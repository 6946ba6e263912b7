//! Risk Cache - memoization engine for listing risk analysis
//!
//! Category-aware TTL/LRU caching of product, seller and price-history
//! results, a retry-with-backoff executor for refreshing them, and
//! performance tracking over both.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod resilience;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::{Category, IntelligentCache};
pub use config::Config;
pub use error::{CacheError, ExecutionError, StorageError};
pub use metrics::PerformanceTracker;
pub use resilience::ResilientExecutor;
pub use storage::{KeyValueStore, MemoryStore};
pub use tasks::{spawn_maintenance_task, spawn_reporting_task, TaskHandle};
