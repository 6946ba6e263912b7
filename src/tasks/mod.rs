//! Background Tasks Module
//!
//! Periodic tasks that run for the lifetime of the engine.
//!
//! # Tasks
//! - Maintenance: purges expired cache entries at a fixed interval
//! - Reporting: persists a performance metrics report at a fixed interval

mod maintenance;
mod reporting;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

pub use maintenance::spawn_maintenance_task;
pub use reporting::spawn_reporting_task;

// == Task Handle ==
/// Owns a spawned periodic task.
///
/// [`stop`](TaskHandle::stop) signals the task and waits for it to finish
/// its current iteration. Dropping the handle without stopping aborts the
/// task.
#[derive(Debug)]
pub struct TaskHandle {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl TaskHandle {
    /// Spawns `task`, handing it the receiving side of the shutdown signal.
    pub(crate) fn spawn<F, Fut>(task: F) -> Self
    where
        F: FnOnce(watch::Receiver<bool>) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let (shutdown, receiver) = watch::channel(false);
        let handle = tokio::spawn(task(receiver));
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Signals the task to stop and waits for it to exit.
    ///
    /// Returns false if the task had panicked or was aborted.
    pub async fn stop(mut self) -> bool {
        let _ = self.shutdown.send(true);
        let Some(handle) = self.handle.take() else {
            return true;
        };

        match handle.await {
            Ok(()) => true,
            Err(e) if e.is_panic() => {
                warn!(error = %e, "Background task panicked");
                false
            }
            Err(e) => {
                warn!(error = %e, "Background task did not exit cleanly");
                false
            }
        }
    }

    /// Aborts the task without waiting.
    pub fn abort(&self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Resolves once shutdown is requested or the handle is gone.
pub(crate) async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_stop_clean_task() {
        let handle = TaskHandle::spawn(|mut shutdown| async move {
            shutdown_requested(&mut shutdown).await;
        });

        assert!(handle.stop().await);
    }

    #[tokio::test]
    async fn test_stop_reports_panicked_task() {
        let handle = TaskHandle::spawn(|_shutdown| async move {
            panic!("sweep blew up");
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(handle.is_finished());
        assert!(!handle.stop().await);
    }

    #[tokio::test]
    async fn test_stop_reports_aborted_task() {
        let handle = TaskHandle::spawn(|mut shutdown| async move {
            shutdown_requested(&mut shutdown).await;
            std::future::pending::<()>().await;
        });
        handle.abort();

        assert!(!handle.stop().await);
    }
}
