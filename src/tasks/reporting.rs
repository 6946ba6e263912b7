//! Metrics Reporting Task
//!
//! Background task that periodically persists a performance report.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::ExecutionError;
use crate::metrics::PerformanceTracker;
use crate::resilience::ResilientExecutor;
use crate::storage::KeyValueStore;
use crate::tasks::{shutdown_requested, TaskHandle};

/// Spawns a background task that writes a metrics report to `store` every
/// `interval`.
///
/// Each write goes through `executor`, so transient store failures are
/// retried with backoff. Stopping the task cancels any pending backoff. A
/// write that still fails is logged and tried again on the next tick.
pub fn spawn_reporting_task(
    tracker: Arc<PerformanceTracker>,
    store: Arc<dyn KeyValueStore>,
    executor: ResilientExecutor,
    interval: Duration,
) -> TaskHandle {
    TaskHandle::spawn(move |mut shutdown| async move {
        info!(
            "Starting metrics reporting task with interval of {} seconds",
            interval.as_secs()
        );
        let executor = executor.with_cancellation(shutdown.clone());

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown_requested(&mut shutdown) => break,
            }

            let persist = || {
                let tracker = Arc::clone(&tracker);
                let store = Arc::clone(&store);
                async move {
                    tracker
                        .report_metrics(store.as_ref())
                        .await
                        .map_err(anyhow::Error::from)
                }
            };

            match executor.execute(persist).await {
                Ok(report) => debug!(
                    operations = report.operations.len(),
                    "Metrics report written"
                ),
                Err(ExecutionError::Cancelled { attempts }) => {
                    debug!(attempts, "Metrics report abandoned on shutdown");
                    break;
                }
                Err(e) => warn!(error = %e, "Failed to persist metrics report"),
            }
        }

        debug!("Metrics reporting task stopped");
    })
}
