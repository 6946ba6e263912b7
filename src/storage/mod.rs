//! Storage Module
//!
//! Key-value store abstraction the cache and tracker persist through.
//!
//! Implementations may be durable or in-memory; callers never assume an
//! operation completes synchronously.

mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageResult;

pub use memory::MemoryStore;

// == Key-Value Store ==
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Reads the value stored under `key`, if any.
    async fn get(&self, key: &str) -> StorageResult<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> StorageResult<()>;

    /// Deletes `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}
