//! Intelligent Cache Module
//!
//! Category-aware cache combining an in-memory LRU index with payloads held
//! in a key-value store. Expiry is enforced lazily on read and proactively
//! by [`purge_expired`](IntelligentCache::purge_expired).

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::{
    CacheEntry, CacheIndex, CacheStats, Category, CategoryTtls, Clock, StoredEntry, SystemClock,
    MAX_KEY_LENGTH,
};
use crate::config::Config;
use crate::error::{CacheError, RefreshError, Result, StorageError};
use crate::metrics::{PerformanceTracker, OP_CACHE_GET, OP_CACHE_MAINTENANCE, OP_CACHE_SET};
use crate::resilience::{ResilientExecutor, ValueSource};
use crate::storage::KeyValueStore;

/// Prefix separating cache payloads from other records in the store.
const STORAGE_PREFIX: &str = "cache:";

// == Intelligent Cache ==
/// Cheap to clone; clones share the same index, store and tracker.
///
/// Operations are serialized: the index lock is held across the store
/// round-trips of a single call, so eviction decisions never race.
#[derive(Clone)]
pub struct IntelligentCache {
    index: Arc<Mutex<CacheIndex>>,
    store: Arc<dyn KeyValueStore>,
    tracker: Arc<PerformanceTracker>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for IntelligentCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntelligentCache")
            .field("clock", &self.clock)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

impl IntelligentCache {
    // == Constructor ==
    /// Creates a cache sized and timed from `config`, reading the system clock.
    pub fn new(
        config: &Config,
        store: Arc<dyn KeyValueStore>,
        tracker: Arc<PerformanceTracker>,
    ) -> Self {
        Self::with_capacity(config.max_entries, config.ttls, store, tracker)
    }

    /// Creates a cache holding at most `max_entries` (minimum one).
    pub fn with_capacity(
        max_entries: usize,
        ttls: CategoryTtls,
        store: Arc<dyn KeyValueStore>,
        tracker: Arc<PerformanceTracker>,
    ) -> Self {
        Self {
            index: Arc::new(Mutex::new(CacheIndex::new(max_entries.max(1), ttls))),
            store,
            tracker,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the time source used for entry timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn tracker(&self) -> &Arc<PerformanceTracker> {
        &self.tracker
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    // == Get ==
    /// Returns the live value for `key`, or None on a miss.
    ///
    /// Expiry is evaluated against the category the entry was stored with;
    /// `category` only attributes a miss when nothing is stored. An expired
    /// entry is removed before returning None. Store failures are returned as
    /// errors, never as misses.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, category: Category) -> Result<Option<T>> {
        let _timer = self.tracker.timer(OP_CACHE_GET);
        validate_key(key)?;

        let mut index = self.index.lock().await;
        let now = self.clock.now_ms();

        let Some(entry) = index.entry(key).cloned() else {
            self.tracker.record_miss(category);
            debug!(key, %category, "Cache miss");
            return Ok(None);
        };

        if entry.is_expired(now, index.ttls()) {
            self.store.remove(&storage_key(key)).await?;
            index.expire(key);
            self.tracker.record_miss(entry.category);
            debug!(key, category = %entry.category, "Expired entry removed on read");
            return Ok(None);
        }

        let Some(raw) = self.store.get(&storage_key(key)).await? else {
            index.remove(key);
            self.tracker.record_miss(entry.category);
            warn!(key, "Indexed entry missing from store, dropping it");
            return Ok(None);
        };

        let stored: StoredEntry = serde_json::from_value(raw).map_err(StorageError::from)?;
        let data = serde_json::from_value(stored.data).map_err(StorageError::from)?;

        index.touch(key, now);
        self.tracker.record_hit(entry.category);
        Ok(Some(data))
    }

    // == Set ==
    /// Stores `data` under `key`, replacing any previous entry and category.
    ///
    /// When the cache is full the least recently used entry is evicted first,
    /// even if `key` is already present.
    pub async fn set<T>(&self, key: &str, data: &T, category: Category) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let _timer = self.tracker.timer(OP_CACHE_SET);
        validate_key(key)?;

        let data = serde_json::to_value(data).map_err(StorageError::from)?;
        let size_estimate = data.to_string().len();

        let mut index = self.index.lock().await;
        let now = self.clock.now_ms();

        if let Some(victim) = index.eviction_candidate() {
            self.store.remove(&storage_key(&victim)).await?;
            index.evict(&victim);
            debug!(evicted = %victim, "Evicted least recently used entry");
        }

        let stored = StoredEntry {
            data,
            category,
            created_at: now,
        };
        let record = serde_json::to_value(&stored).map_err(StorageError::from)?;
        self.store.set(&storage_key(key), record).await?;

        index.insert(key, CacheEntry::new(category, size_estimate, now));
        self.tracker.record_set(category);
        Ok(())
    }

    // == Remove ==
    /// Deletes `key` if present. Removing an absent key is a no-op.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let mut index = self.index.lock().await;
        self.store.remove(&storage_key(key)).await?;
        if index.remove(key).is_some() {
            debug!(key, "Cache entry removed");
        }
        Ok(())
    }

    // == Purge Expired ==
    /// Removes every entry whose category TTL has elapsed, whether or not it
    /// is ever read again. Returns the number of entries removed.
    ///
    /// Stops at the first store failure; entries already purged stay purged.
    pub async fn purge_expired(&self) -> Result<usize> {
        let _timer = self.tracker.timer(OP_CACHE_MAINTENANCE);

        let mut index = self.index.lock().await;
        let now = self.clock.now_ms();

        let mut removed = 0;
        for key in index.expired_keys(now) {
            self.store.remove(&storage_key(&key)).await?;
            index.expire(&key);
            removed += 1;
        }
        Ok(removed)
    }

    // == Read-through ==
    /// Returns the cached value, or computes it with `executor` on a miss and
    /// caches the result.
    pub async fn get_or_refresh<T, F, Fut>(
        &self,
        key: &str,
        category: Category,
        executor: &ResilientExecutor,
        operation: F,
    ) -> std::result::Result<T, RefreshError>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        if let Some(cached) = self.get(key, category).await? {
            return Ok(cached);
        }

        let value = executor.execute(operation).await?;
        self.set(key, &value, category).await?;
        Ok(value)
    }

    /// Like [`get_or_refresh`](Self::get_or_refresh), degrading to `fallback`
    /// when every attempt fails. Fallback values are returned but never cached.
    pub async fn get_or_refresh_with_fallback<T, F, Fut, G, GFut>(
        &self,
        key: &str,
        category: Category,
        executor: &ResilientExecutor,
        operation: F,
        fallback: G,
    ) -> std::result::Result<T, RefreshError>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
        G: FnOnce() -> GFut,
        GFut: Future<Output = anyhow::Result<T>>,
    {
        if let Some(cached) = self.get(key, category).await? {
            return Ok(cached);
        }

        let outcome = executor.execute_detailed(operation, fallback).await?;
        match outcome.source {
            ValueSource::Operation => self.set(key, &outcome.value, category).await?,
            ValueSource::Fallback => debug!(key, %category, "Serving uncached fallback value"),
        }
        Ok(outcome.value)
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        let index = self.index.lock().await;
        CacheStats {
            total_entries: index.len(),
            total_size: index.total_size(),
            evictions: index.evictions(),
            expirations: index.expirations(),
            categories: self.tracker.counters(),
        }
    }

    /// Current number of entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.index.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.index.lock().await.is_empty()
    }

    /// True if `key` has an entry, live or not yet purged.
    pub async fn contains(&self, key: &str) -> bool {
        self.index.lock().await.entry(key).is_some()
    }

    pub async fn max_entries(&self) -> usize {
        self.index.lock().await.max_entries()
    }
}

fn storage_key(key: &str) -> String {
    format!("{}{}", STORAGE_PREFIX, key)
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
