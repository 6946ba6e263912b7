//! Cache Statistics Module
//!
//! Point-in-time snapshot of cache occupancy and per-category counters.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::Category;
use crate::metrics::CategoryCounters;

// == Cache Stats ==
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Sum of entry size estimates in bytes
    pub total_size: usize,
    /// Entries evicted due to LRU policy
    pub evictions: u64,
    /// Entries removed because their TTL elapsed
    pub expirations: u64,
    /// Hit/miss/set totals per category
    pub categories: BTreeMap<Category, CategoryCounters>,
}

impl CacheStats {
    /// Counters summed over every category.
    pub fn totals(&self) -> CategoryCounters {
        self.categories
            .values()
            .fold(CategoryCounters::new(), |mut acc, counters| {
                acc.merge(counters);
                acc
            })
    }

    /// Overall hit rate across categories.
    pub fn hit_rate(&self) -> f64 {
        self.totals().hit_rate()
    }
}
