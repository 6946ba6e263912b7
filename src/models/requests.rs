//! Request DTOs for the cache API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

/// Request body for the SET operation (PUT /cache/:category/:key)
///
/// The key and category come from the path; the body only carries the
/// payload, which may be any JSON value.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The analysis result to cache
    pub value: Value,
}
