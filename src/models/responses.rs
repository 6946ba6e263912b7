//! Response DTOs for the cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheStats, Category};
use crate::metrics::CategoryCounters;

/// Response body for the GET operation (GET /cache/:category/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// Category the lookup was made under
    pub category: Category,
    /// The cached value
    pub value: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, category: Category, value: Value) -> Self {
        Self {
            key: key.into(),
            category,
            value,
        }
    }
}

/// Response body for the SET operation (PUT /cache/:category/:key)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
    pub category: Category,
}

impl SetResponse {
    pub fn new(key: impl Into<String>, category: Category) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' cached as {}", key, category),
            key,
            category,
        }
    }
}

/// Response body for the DELETE operation (DELETE /cache/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was removed
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' removed", key),
            key,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Total hits across categories
    pub hits: u64,
    /// Total misses across categories
    pub misses: u64,
    /// Number of LRU evictions
    pub evictions: u64,
    /// Number of TTL expirations
    pub expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Sum of entry size estimates in bytes
    pub total_size: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Counters per category
    pub categories: BTreeMap<Category, CategoryCounters>,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        let totals = stats.totals();
        Self {
            hits: totals.hits,
            misses: totals.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            total_size: stats.total_size,
            hit_rate: totals.hit_rate(),
            categories: stats.categories,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
