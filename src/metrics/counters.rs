//! Category Counters Module
//!
//! Running hit, miss and set totals for a single cache category.

use serde::Serialize;

// == Category Counters ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounters {
    /// Successful cache retrievals
    pub hits: u64,
    /// Lookups that found nothing live (absent or expired)
    pub misses: u64,
    /// Stored entries
    pub sets: u64,
}

impl CategoryCounters {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    /// Adds another set of counters into this one.
    pub fn merge(&mut self, other: &CategoryCounters) {
        self.hits += other.hits;
        self.misses += other.misses;
        self.sets += other.sets;
    }
}
