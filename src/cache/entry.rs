//! Cache Entry Module
//!
//! Metadata kept for every cached key, and the record persisted to the
//! key-value store alongside the payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{Category, CategoryTtls};

// == Cache Entry ==
/// Index metadata for a single cache entry. The payload itself lives in the
/// key-value store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Category fixed at insertion; drives TTL evaluation
    pub category: Category,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Last successful read (Unix milliseconds), never earlier than `created_at`
    pub last_accessed_at: u64,
    /// Serialized payload size in bytes
    pub size_estimate: usize,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates entry metadata stamped at `now`.
    pub fn new(category: Category, size_estimate: usize, now: u64) -> Self {
        Self {
            category,
            created_at: now,
            last_accessed_at: now,
            size_estimate,
        }
    }

    // == Is Expired ==
    /// An entry is expired once strictly more than its category TTL has
    /// elapsed since creation.
    pub fn is_expired(&self, now: u64, ttls: &CategoryTtls) -> bool {
        self.age_ms(now) > ttls.ttl_ms(self.category)
    }

    // == Touch ==
    /// Records a read at `now`. Never moves `last_accessed_at` backwards.
    pub fn touch(&mut self, now: u64) {
        self.last_accessed_at = self.last_accessed_at.max(now);
    }

    /// Milliseconds since creation.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }
}

// == Stored Entry ==
/// Record written to the key-value store for each cached key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry {
    pub data: Value,
    pub category: Category,
    pub created_at: u64,
}
