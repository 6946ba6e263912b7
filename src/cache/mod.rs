//! Cache Module
//!
//! Category-aware caching with TTL expiration, LRU eviction and size accounting.

mod category;
mod clock;
mod entry;
mod index;
mod intelligent;
mod lru;
mod stats;


// Re-export public types
pub use category::{Category, CategoryTtls};
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, StoredEntry};
pub use index::CacheIndex;
pub use intelligent::IntelligentCache;
pub use lru::LruTracker;
pub use stats::CacheStats;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
