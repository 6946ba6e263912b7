//! Cache Index Module
//!
//! In-memory bookkeeping for the intelligent cache: entry metadata, LRU
//! order and capacity accounting. Holds no payloads and performs no I/O.

use std::collections::HashMap;

use crate::cache::{CacheEntry, CategoryTtls, LruTracker};

// == Cache Index ==
#[derive(Debug)]
pub struct CacheIndex {
    /// Metadata by key
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL per category
    ttls: CategoryTtls,
    /// Entries removed to make room
    evictions: u64,
    /// Entries removed because their TTL elapsed
    expirations: u64,
}

impl CacheIndex {
    // == Constructor ==
    pub fn new(max_entries: usize, ttls: CategoryTtls) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            max_entries,
            ttls,
            evictions: 0,
            expirations: 0,
        }
    }

    pub fn entry(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn ttls(&self) -> &CategoryTtls {
        &self.ttls
    }

    // == Eviction Candidate ==
    /// Returns the key that must be evicted before the next insert, if any.
    /// A full index always yields its least recently used key, overwrites
    /// included, and that key may be the one being overwritten.
    pub fn eviction_candidate(&self) -> Option<String> {
        if self.entries.len() < self.max_entries {
            return None;
        }
        self.lru.peek_oldest().map(str::to_string)
    }

    // == Insert ==
    /// Inserts or overwrites metadata for `key`.
    pub fn insert(&mut self, key: &str, entry: CacheEntry) {
        self.lru.touch(key, entry.last_accessed_at);
        self.entries.insert(key.to_string(), entry);
    }

    // == Touch ==
    /// Records a successful read of `key` at `now`.
    pub fn touch(&mut self, key: &str, now: u64) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.touch(now);
            self.lru.touch(key, entry.last_accessed_at);
        }
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.lru.remove(key);
        }
        removed
    }

    /// Removes `key` as an LRU victim and counts the eviction.
    pub fn evict(&mut self, key: &str) -> Option<CacheEntry> {
        let removed = self.remove(key);
        if removed.is_some() {
            self.evictions += 1;
        }
        removed
    }

    /// Removes `key` as expired and counts the expiration.
    pub fn expire(&mut self, key: &str) -> Option<CacheEntry> {
        let removed = self.remove(key);
        if removed.is_some() {
            self.expirations += 1;
        }
        removed
    }

    // == Expired Keys ==
    /// Collects every key whose TTL has elapsed at `now`.
    pub fn expired_keys(&self, now: u64) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, &self.ttls))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Sum of size estimates over all entries.
    pub fn total_size(&self) -> usize {
        self.entries.values().map(|entry| entry.size_estimate).sum()
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn expirations(&self) -> u64 {
        self.expirations
    }
}
