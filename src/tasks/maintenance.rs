//! Cache Maintenance Task
//!
//! Background task that periodically purges expired cache entries, so keys
//! that are never read again still leave memory.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::IntelligentCache;
use crate::tasks::{shutdown_requested, TaskHandle};

/// Spawns a background task that purges expired entries every `interval`.
///
/// The first sweep runs one full interval after spawning. A failed sweep is
/// logged and retried on the next tick.
///
/// # Example
/// ```ignore
/// let handle = spawn_maintenance_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// handle.stop().await;
/// ```
pub fn spawn_maintenance_task(cache: IntelligentCache, interval: Duration) -> TaskHandle {
    TaskHandle::spawn(move |mut shutdown| async move {
        info!(
            "Starting cache maintenance task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown_requested(&mut shutdown) => break,
            }

            match cache.purge_expired().await {
                Ok(0) => debug!("Cache maintenance: no expired entries found"),
                Ok(removed) => info!("Cache maintenance: removed {} expired entries", removed),
                Err(e) => warn!(error = %e, "Cache maintenance sweep failed"),
            }
        }

        debug!("Cache maintenance task stopped");
    })
}
