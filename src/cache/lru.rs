//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::collections::{BTreeMap, HashMap};

/// Position of a key in the access order: last access timestamp, then a
/// monotonically increasing touch sequence to break timestamp ties.
type AccessStamp = (u64, u64);

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Keys are ordered by `(last_accessed_at, touch sequence)`, so the first
/// element is always the least recently used key. Among keys sharing the
/// same timestamp the one touched first is evicted first.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Keys by access stamp, oldest first
    order: BTreeMap<AccessStamp, String>,
    /// Current stamp for each tracked key
    stamps: HashMap<String, AccessStamp>,
    /// Next touch sequence number
    sequence: u64,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as accessed at `accessed_at`.
    pub fn touch(&mut self, key: &str, accessed_at: u64) {
        self.remove(key);
        let stamp = (accessed_at, self.sequence);
        self.sequence += 1;
        self.order.insert(stamp, key.to_string());
        self.stamps.insert(key.to_string(), stamp);
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        if let Some(stamp) = self.stamps.remove(key) {
            self.order.remove(&stamp);
        }
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&str> {
        self.order.values().next().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.stamps.contains_key(key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_new() {
        let lru = LruTracker::new();
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
    }

    #[test]
    fn test_lru_touch_new_key() {
        let mut lru = LruTracker::new();

        lru.touch("key1", 10);
        lru.touch("key2", 20);
        lru.touch("key3", 30);

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.peek_oldest(), Some("key1"));
    }

    #[test]
    fn test_lru_touch_existing_key() {
        let mut lru = LruTracker::new();

        lru.touch("key1", 10);
        lru.touch("key2", 20);
        lru.touch("key3", 30);

        lru.touch("key1", 40);

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.peek_oldest(), Some("key2"));
    }

    #[test]
    fn test_lru_equal_timestamps_evict_first_touched() {
        let mut lru = LruTracker::new();

        lru.touch("a", 100);
        lru.touch("b", 100);
        lru.touch("c", 100);

        assert_eq!(lru.peek_oldest(), Some("a"));
        lru.remove("a");
        assert_eq!(lru.peek_oldest(), Some("b"));
        lru.remove("b");
        assert_eq!(lru.peek_oldest(), Some("c"));
    }

    #[test]
    fn test_lru_orders_by_timestamp_not_touch_order() {
        let mut lru = LruTracker::new();

        lru.touch("late", 500);
        lru.touch("early", 100);

        assert_eq!(lru.peek_oldest(), Some("early"));
    }

    #[test]
    fn test_lru_peek_empty() {
        let lru = LruTracker::new();
        assert_eq!(lru.peek_oldest(), None);
    }

    #[test]
    fn test_lru_remove() {
        let mut lru = LruTracker::new();

        lru.touch("key1", 1);
        lru.touch("key2", 2);
        lru.touch("key3", 3);

        lru.remove("key2");
        lru.remove("nonexistent");

        assert_eq!(lru.len(), 2);
        assert!(!lru.contains("key2"));
        assert!(lru.contains("key1"));
        assert!(lru.contains("key3"));
    }

    #[test]
    fn test_lru_touch_same_key_multiple_times() {
        let mut lru = LruTracker::new();

        lru.touch("key1", 1);
        lru.touch("key1", 1);
        lru.touch("key1", 2);

        assert_eq!(lru.len(), 1);
        assert_eq!(lru.peek_oldest(), Some("key1"));
        lru.remove("key1");
        assert!(lru.is_empty());
    }
}
