//! Error types for the risk cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Storage Error ==
/// Failure reported by a key-value store backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend could not complete the operation
    #[error("Storage backend failure: {0}")]
    Backend(String),

    /// A payload could not be encoded or decoded
    #[error("Serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Cache Error Enum ==
/// Errors surfaced by the intelligent cache.
///
/// A cache miss is never an error: `get` returns `Ok(None)` for it.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The key-value store could not complete an operation
    #[error("Storage failure: {0}")]
    StorageFailure(#[from] StorageError),

    /// Key rejected before reaching the store
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Unknown category name
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
}

// == Execution Error Enum ==
/// Terminal failures of the resilient operation executor.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// Every attempt failed and no fallback was supplied; carries the last failure
    #[error("Operation failed after {attempts} attempts: {source}")]
    OperationFailure {
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },

    /// The fallback itself failed
    #[error("Fallback failed: {0}")]
    FallbackFailure(#[source] anyhow::Error),

    /// A backoff wait was interrupted by the cancellation signal
    #[error("Execution cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

// == Refresh Error ==
/// Failure of a read-through lookup: either the cache or the producer failed.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

// == API Error ==
/// Error type returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// No live entry for the key
    #[error("Key not found: {0}")]
    NotFound(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Cache(CacheError::InvalidKey(_))
            | ApiError::Cache(CacheError::InvalidCategory(_)) => StatusCode::BAD_REQUEST,
            ApiError::Cache(CacheError::StorageFailure(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Aliases ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Result type for key-value store operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
