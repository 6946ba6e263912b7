//! Resilient Operation Executor
//!
//! Runs a fallible async producer with bounded retries and exponential
//! backoff, optionally degrading to a fallback producer.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ExecutionError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(1000);

// == Value Source ==
/// Which producer supplied an execution's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Operation,
    Fallback,
}

// == Execution Outcome ==
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome<T> {
    pub value: T,
    /// Attempts made on the primary operation
    pub attempts: u32,
    pub source: ValueSource,
}

/// Result of running the primary operation to completion or exhaustion.
enum Attempts<T> {
    Succeeded { value: T, attempts: u32 },
    Exhausted { last_error: anyhow::Error, attempts: u32 },
    Cancelled { attempts: u32 },
}

// == Resilient Executor ==
/// Stateless retry policy. Cloning is cheap and calls never share state.
#[derive(Debug, Clone)]
pub struct ResilientExecutor {
    max_attempts: u32,
    backoff: Duration,
    cancel: Option<watch::Receiver<bool>>,
}

impl ResilientExecutor {
    // == Constructor ==
    /// `max_attempts` counts the first try; zero is treated as one.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            cancel: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_retries, config.backoff())
    }

    /// Makes backoff waits abort as soon as `cancel` holds `true`.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    // == Backoff ==
    /// Delay after the failed zero-indexed `attempt`: `backoff * 2^attempt`,
    /// saturating at `Duration::MAX`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.backoff.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }

    // == Execute ==
    /// Runs `operation` until it succeeds or attempts run out. The terminal
    /// error carries the last attempt's failure.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> Result<T, ExecutionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        match self.run_attempts(operation).await {
            Attempts::Succeeded { value, .. } => Ok(value),
            Attempts::Exhausted { last_error, attempts } => {
                Err(ExecutionError::OperationFailure {
                    attempts,
                    source: last_error,
                })
            }
            Attempts::Cancelled { attempts } => Err(ExecutionError::Cancelled { attempts }),
        }
    }

    /// Like [`execute`](Self::execute), but answers with `fallback` once all
    /// attempts fail. A failing fallback is not retried.
    pub async fn execute_with_fallback<T, F, Fut, G, GFut>(
        &self,
        operation: F,
        fallback: G,
    ) -> Result<T, ExecutionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
        G: FnOnce() -> GFut,
        GFut: Future<Output = anyhow::Result<T>>,
    {
        self.execute_detailed(operation, fallback)
            .await
            .map(|outcome| outcome.value)
    }

    /// Same policy as [`execute_with_fallback`](Self::execute_with_fallback),
    /// reporting which producer supplied the value.
    pub async fn execute_detailed<T, F, Fut, G, GFut>(
        &self,
        operation: F,
        fallback: G,
    ) -> Result<ExecutionOutcome<T>, ExecutionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
        G: FnOnce() -> GFut,
        GFut: Future<Output = anyhow::Result<T>>,
    {
        match self.run_attempts(operation).await {
            Attempts::Succeeded { value, attempts } => Ok(ExecutionOutcome {
                value,
                attempts,
                source: ValueSource::Operation,
            }),
            Attempts::Exhausted { last_error, attempts } => {
                warn!(
                    attempts,
                    error = %last_error,
                    "All attempts failed, using fallback"
                );
                let value = fallback().await.map_err(ExecutionError::FallbackFailure)?;
                Ok(ExecutionOutcome {
                    value,
                    attempts,
                    source: ValueSource::Fallback,
                })
            }
            Attempts::Cancelled { attempts } => Err(ExecutionError::Cancelled { attempts }),
        }
    }

    async fn run_attempts<T, F, Fut>(&self, mut operation: F) -> Attempts<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let mut attempt = 0;
        loop {
            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(attempts = attempt + 1, "Operation succeeded after retry");
                    }
                    return Attempts::Succeeded {
                        value,
                        attempts: attempt + 1,
                    };
                }
                Err(error) => error,
            };

            let attempts = attempt + 1;
            if attempts >= self.max_attempts {
                return Attempts::Exhausted {
                    last_error: error,
                    attempts,
                };
            }

            let delay = self.backoff_for(attempt);
            warn!(
                attempt = attempts,
                max_attempts = self.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Operation failed, retrying after backoff"
            );

            if self.wait(delay).await {
                debug!(attempts, "Backoff interrupted by cancellation");
                return Attempts::Cancelled { attempts };
            }
            attempt += 1;
        }
    }

    /// Sleeps for `delay`. Returns true if cancelled first.
    async fn wait(&self, delay: Duration) -> bool {
        let Some(cancel) = &self.cancel else {
            tokio::time::sleep(delay).await;
            return false;
        };

        let mut cancel = cancel.clone();
        if *cancel.borrow() {
            return true;
        }

        let cancelled = async move {
            let signalled = cancel.wait_for(|cancelled| *cancelled).await.map(|_| ());
            // A dropped sender can never cancel
            if signalled.is_err() {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => false,
            _ = cancelled => true,
        }
    }
}

impl Default for ResilientExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BACKOFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[test]
    fn test_backoff_schedule() {
        let executor = ResilientExecutor::new(3, Duration::from_millis(1000));
        assert_eq!(executor.backoff_for(0), Duration::from_millis(1000));
        assert_eq!(executor.backoff_for(1), Duration::from_millis(2000));
        assert_eq!(executor.backoff_for(2), Duration::from_millis(4000));
    }

    #[test]
    fn test_backoff_saturates() {
        let executor = ResilientExecutor::new(3, Duration::from_secs(1));
        assert_eq!(executor.backoff_for(64), Duration::MAX);
    }

    #[test]
    fn test_zero_attempts_means_one() {
        assert_eq!(ResilientExecutor::new(0, DEFAULT_BACKOFF).max_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_does_not_wait() {
        let executor = ResilientExecutor::default();
        let started = Instant::now();

        let value = executor.execute(|| async { Ok(7) }).await.unwrap();

        assert_eq!(value, 7);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_timing_between_attempts() {
        let executor = ResilientExecutor::new(3, Duration::from_millis(1000));
        let started = Instant::now();
        let attempt_times = Arc::new(Mutex::new(Vec::new()));

        let times = attempt_times.clone();
        let result: Result<(), _> = executor
            .execute(move || {
                times.lock().unwrap().push(started.elapsed());
                async { Err(anyhow!("upstream down")) }
            })
            .await;

        assert!(matches!(
            result,
            Err(ExecutionError::OperationFailure { attempts: 3, .. })
        ));

        let times = attempt_times.lock().unwrap().clone();
        assert_eq!(times.len(), 3);
        let first_gap = times[1] - times[0];
        let second_gap = times[2] - times[1];
        assert!(first_gap >= Duration::from_millis(1000) && first_gap < Duration::from_millis(1100));
        assert!(second_gap >= Duration::from_millis(2000) && second_gap < Duration::from_millis(2100));
        // No wait after the final attempt
        assert!(started.elapsed() < Duration::from_millis(3100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_error_is_last_failure() {
        let executor = ResilientExecutor::new(3, Duration::from_millis(10));
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = executor
            .execute(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Err(anyhow!("failure #{}", n)) }
            })
            .await;

        match result {
            Err(ExecutionError::OperationFailure { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert_eq!(source.to_string(), "failure #3");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_used_after_exhaustion() {
        let executor = ResilientExecutor::new(3, Duration::from_millis(10));
        let calls = AtomicU32::new(0);

        let outcome = executor
            .execute_detailed(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err::<&str, _>(anyhow!("model endpoint timeout")) }
                },
                || async { Ok("degraded") },
            )
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.value, "degraded");
        assert_eq!(outcome.source, ValueSource::Fallback);
        assert_eq!(outcome.attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_not_invoked_when_operation_recovers() {
        let executor = ResilientExecutor::new(3, Duration::from_millis(10));
        let calls = AtomicU32::new(0);
        let fallback_called = AtomicU32::new(0);

        let value = executor
            .execute_with_fallback(
                || {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if n == 0 {
                            Err(anyhow!("transient"))
                        } else {
                            Ok("fresh")
                        }
                    }
                },
                || {
                    fallback_called.fetch_add(1, Ordering::SeqCst);
                    async { Ok("degraded") }
                },
            )
            .await
            .unwrap();

        assert_eq!(value, "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(fallback_called.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_failure_is_fatal() {
        let executor = ResilientExecutor::new(2, Duration::from_millis(10));
        let fallback_calls = AtomicU32::new(0);

        let result: Result<u8, _> = executor
            .execute_with_fallback(
                || async { Err(anyhow!("primary")) },
                || {
                    fallback_calls.fetch_add(1, Ordering::SeqCst);
                    async { Err(anyhow!("fallback broke")) }
                },
            )
            .await;

        match result {
            Err(ExecutionError::FallbackFailure(source)) => {
                assert_eq!(source.to_string(), "fallback broke");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_backoff() {
        let (tx, rx) = watch::channel(false);
        let executor =
            ResilientExecutor::new(3, Duration::from_secs(60)).with_cancellation(rx);
        let started = Instant::now();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            tx.send(true).unwrap();
        });

        let result: Result<(), _> = executor
            .execute(|| async { Err(anyhow!("always failing")) })
            .await;

        canceller.await.unwrap();
        assert!(matches!(result, Err(ExecutionError::Cancelled { attempts: 1 })));
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_cancel_sender_does_not_cancel() {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        let executor =
            ResilientExecutor::new(2, Duration::from_millis(100)).with_cancellation(rx);
        let started = Instant::now();

        let result: Result<(), _> = executor
            .execute(|| async { Err(anyhow!("always failing")) })
            .await;

        assert!(matches!(
            result,
            Err(ExecutionError::OperationFailure { attempts: 2, .. })
        ));
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_executions_are_independent() {
        let executor = ResilientExecutor::new(3, Duration::from_millis(50));

        let failing = executor.execute(|| async { Err::<u32, _>(anyhow!("nope")) });
        let succeeding = executor.execute(|| async { Ok(1u32) });
        let (failing, succeeding) = tokio::join!(failing, succeeding);

        assert!(failing.is_err());
        assert_eq!(succeeding.unwrap(), 1);
    }
}
