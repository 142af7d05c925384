//! Per-entry retry with linear, cancellable backoff
//!
//! Attempts are fetch→map→validate round trips. Only errors that
//! [`IngestError::is_retryable`] accepts are retried; the sleep before each
//! retry races the run's cancellation token.

use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::errors::{IngestError, IngestResult};

/// Retry behaviour for a single entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Multiplied by the retry number to get the backoff
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Backoff before retry `retry` (1-based): `base_delay * retry`
    pub fn delay_before(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(retry)
    }
}

/// How a retried operation ended
#[derive(Debug)]
pub enum RetryOutcome<T> {
    Succeeded { value: T, attempts: u32 },
    /// Every attempt failed with a retryable error
    Exhausted { error: IngestError, attempts: u32 },
    /// A non-retryable error stopped the loop
    Aborted { error: IngestError, attempts: u32 },
    /// Cancelled while waiting to retry
    Cancelled { error: IngestError, attempts: u32 },
}

impl<T> RetryOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded { attempts, .. }
            | RetryOutcome::Exhausted { attempts, .. }
            | RetryOutcome::Aborted { attempts, .. }
            | RetryOutcome::Cancelled { attempts, .. } => *attempts,
        }
    }
}

/// Sleep for `delay` unless the token fires first. Returns `false` when cancelled.
pub async fn sleep_or_cancel(delay: Duration, cancellation: &CancellationToken) -> bool {
    if cancellation.is_cancelled() {
        return false;
    }
    if delay.is_zero() {
        return true;
    }
    tokio::select! {
        _ = cancellation.cancelled() => false,
        _ = sleep(delay) => true,
    }
}

/// Execute an operation with retry logic
///
/// # Arguments
///
/// * `policy` - Retry configuration
/// * `cancellation` - Checked before every backoff sleep
/// * `operation` - Async closure performing one attempt
/// * `operation_name` - Human-readable name for logging
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancellation: &CancellationToken,
    mut operation: F,
    operation_name: &str,
) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = IngestResult<T>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        let error = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        "'{}' succeeded on attempt {}/{}",
                        operation_name, attempt, max_attempts
                    );
                }
                return RetryOutcome::Succeeded {
                    value,
                    attempts: attempt,
                };
            }
            Err(error) => error,
        };

        if !error.is_retryable() {
            debug!(
                "'{}' failed with non-retryable error: {}",
                operation_name, error
            );
            return RetryOutcome::Aborted {
                error,
                attempts: attempt,
            };
        }

        if attempt >= max_attempts {
            warn!(
                "'{}' failed after {} attempts: {}",
                operation_name, attempt, error
            );
            return RetryOutcome::Exhausted {
                error,
                attempts: attempt,
            };
        }

        let delay = policy.delay_before(attempt);
        warn!(
            "'{}' failed on attempt {}/{}, retrying in {:?}: {}",
            operation_name, attempt, max_attempts, delay, error
        );

        if !sleep_or_cancel(delay, cancellation).await {
            debug!("'{}' cancelled before retry {}", operation_name, attempt);
            return RetryOutcome::Cancelled {
                error,
                attempts: attempt,
            };
        }
        attempt += 1;
    }
}
