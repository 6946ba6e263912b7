//! Resilience Module
//!
//! Retry-with-backoff execution used to (re)compute cached values.

mod executor;

pub use executor::{
    ExecutionOutcome, ResilientExecutor, ValueSource, DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS,
};
