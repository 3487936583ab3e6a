//! Retry utilities for throttled operations
//!
//! Retries use a fixed delay between attempts rather than exponential backoff:
//! the trends service lifts its rate limit after a fixed cool-down, so waiting
//! longer on each attempt only slows the run down.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::utils::delay::{Delay, DelayKind};

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,

    /// Pause between a retryable failure and the next attempt
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Create a retry policy
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

/// Why a retried operation gave up
#[derive(Debug, Error)]
pub enum RetryError<E: std::error::Error + 'static> {
    /// Every attempt failed with a retryable error
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: E,
    },

    /// A non-retryable error ended the loop early
    #[error("{error}")]
    Aborted {
        attempt: u32,
        #[source]
        error: E,
    },
}

impl<E: std::error::Error + 'static> RetryError<E> {
    /// Number of attempts made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } => *attempts,
            Self::Aborted { attempt, .. } => *attempt,
        }
    }

    /// The error of the final attempt
    pub fn into_inner(self) -> E {
        match self {
            Self::Exhausted { last, .. } => last,
            Self::Aborted { error, .. } => error,
        }
    }
}

/// Execute an operation, retrying only errors accepted by `should_retry`
///
/// The operation receives the 1-based attempt number. Between a retryable
/// failure and the next attempt the policy delay is taken through `delay`; no
/// pause follows the final attempt.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use trendscope::utils::delay::TokioDelay;
/// use trendscope::utils::retry::{with_retry_if, RetryPolicy};
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("busy")]
/// struct Busy;
///
/// #[tokio::main]
/// async fn main() {
///     let policy = RetryPolicy::new(3, Duration::from_secs(1));
///     let result = with_retry_if(
///         &policy,
///         &TokioDelay,
///         |_attempt| async { Ok::<_, Busy>(42) },
///         |_e: &Busy| true,
///     )
///     .await;
///     assert_eq!(result.unwrap(), 42);
/// }
/// ```
pub async fn with_retry_if<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    delay: &dyn Delay,
    mut operation: F,
    should_retry: P,
) -> Result<T, RetryError<E>>
where
    E: std::error::Error + 'static,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if !should_retry(&e) => {
                warn!(attempt, error = %e, "Non-retryable error encountered");
                return Err(RetryError::Aborted { attempt, error: e });
            }
            Err(e) if attempt >= max_attempts => {
                warn!(attempt, max_attempts, error = %e, "Retry attempts exhausted");
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: e,
                });
            }
            Err(e) => {
                warn!(
                    attempt,
                    max_attempts,
                    delay_secs = policy.delay.as_secs(),
                    error = %e,
                    "Operation failed, will retry"
                );
                delay.pause(DelayKind::Retry, policy.delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::delay::RecordingDelay;

    #[derive(Debug, Error)]
    enum TestError {
        #[error("busy")]
        Busy,
        #[error("broken")]
        Broken,
    }

    fn is_busy(e: &TestError) -> bool {
        matches!(e, TestError::Busy)
    }

    #[tokio::test]
    async fn test_retry_success_first_attempt() {
        let delay = RecordingDelay::new();
        let policy = RetryPolicy::default();
        let result = with_retry_if(&policy, &delay, |_| async { Ok::<_, TestError>(42) }, is_busy)
            .await;
        assert_eq!(result.unwrap(), 42);
        assert!(delay.pauses().is_empty());
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let delay = RecordingDelay::new();
        let policy = RetryPolicy::new(3, Duration::from_secs(60));
        let mut calls = 0;

        let result = with_retry_if(
            &policy,
            &delay,
            |attempt| {
                calls += 1;
                async move {
                    if attempt < 3 {
                        Err(TestError::Busy)
                    } else {
                        Ok(attempt)
                    }
                }
            },
            is_busy,
        )
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
        assert_eq!(delay.count(DelayKind::Retry), 2);
    }

    #[tokio::test]
    async fn test_retry_exhausted() {
        let delay = RecordingDelay::new();
        let policy = RetryPolicy::new(3, Duration::from_secs(60));

        let result: Result<(), _> =
            with_retry_if(&policy, &delay, |_| async { Err(TestError::Busy) }, is_busy).await;

        let err = result.unwrap_err();
        assert!(matches!(err, RetryError::Exhausted { attempts: 3, .. }));
        // No pause after the final attempt
        assert_eq!(delay.count(DelayKind::Retry), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_aborts_immediately() {
        let delay = RecordingDelay::new();
        let policy = RetryPolicy::default();

        let result: Result<(), _> =
            with_retry_if(&policy, &delay, |_| async { Err(TestError::Broken) }, is_busy).await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts(), 1);
        assert!(matches!(err.into_inner(), TestError::Broken));
        assert!(delay.pauses().is_empty());
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let delay = RecordingDelay::new();
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        let result = with_retry_if(&policy, &delay, |_| async { Ok::<_, TestError>(1) }, is_busy)
            .await;
        assert_eq!(result.unwrap(), 1);
    }
}
