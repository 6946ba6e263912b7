//! Configuration Module
//!
//! Handles loading and managing engine configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::CategoryTtls;

/// Engine configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Base backoff delay in milliseconds between retry attempts
    pub backoff_ms: u64,
    /// Total number of attempts made by the resilient executor
    pub max_retries: u32,
    /// Observations slower than this many milliseconds are logged as warnings
    pub slow_operation_ms: u64,
    /// Maintenance sweep interval in seconds
    pub maintenance_interval: u64,
    /// Metrics report interval in seconds
    pub report_interval: u64,
    /// Per-category time-to-live table
    pub ttls: CategoryTtls,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `BACKOFF_MS` - Base retry backoff in ms (default: 1000)
    /// - `MAX_RETRIES` - Attempts per execution (default: 3)
    /// - `SLOW_OPERATION_MS` - Slow operation threshold in ms (default: 1000)
    /// - `MAINTENANCE_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `REPORT_INTERVAL` - Metrics report frequency in seconds (default: 300)
    /// - `PRODUCT_TTL_SECS`, `SELLER_TTL_SECS`, `PRICE_HISTORY_TTL_SECS` - TTL overrides
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let default_ttls = CategoryTtls::default();

        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            backoff_ms: env_or("BACKOFF_MS", defaults.backoff_ms),
            max_retries: env_or("MAX_RETRIES", defaults.max_retries),
            slow_operation_ms: env_or("SLOW_OPERATION_MS", defaults.slow_operation_ms),
            maintenance_interval: env_or("MAINTENANCE_INTERVAL", defaults.maintenance_interval),
            report_interval: env_or("REPORT_INTERVAL", defaults.report_interval),
            ttls: CategoryTtls {
                product: secs_or("PRODUCT_TTL_SECS", default_ttls.product),
                seller: secs_or("SELLER_TTL_SECS", default_ttls.seller),
                price_history: secs_or("PRICE_HISTORY_TTL_SECS", default_ttls.price_history),
            },
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }

    /// Base backoff delay as a Duration.
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    /// Slow operation threshold as a Duration.
    pub fn slow_operation_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_operation_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            backoff_ms: 1000,
            max_retries: 3,
            slow_operation_ms: 1000,
            maintenance_interval: 60,
            report_interval: 300,
            ttls: CategoryTtls::default(),
            server_port: 3000,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn secs_or(name: &str, default: Duration) -> Duration {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
