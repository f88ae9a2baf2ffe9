//! Retry policies and the backoff retrier.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio_retry2::strategy::FixedInterval;
use tokio_retry2::{Retry, RetryError};
use tollgate_error::RetryableError;
use tracing::{debug, warn};

/// Attempts made by [`RetryPolicy::exponential`].
pub const EXPONENTIAL_MAX_ATTEMPTS: u32 = 5;

/// How many attempts to make and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryPolicy {
    /// Same delay before every retry.
    Fixed {
        /// Total attempts, including the first
        max_attempts: u32,
        /// Delay before each retry
        delay: Duration,
    },
    /// Delay doubles before each retry, without jitter.
    Exponential {
        /// Total attempts, including the first
        max_attempts: u32,
        /// Delay before the second attempt
        initial_delay: Duration,
    },
}

impl RetryPolicy {
    /// Fixed-delay policy. Zero attempts is treated as one.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::Fixed {
            max_attempts,
            delay,
        }
    }

    /// Doubling policy with five attempts: waits `d`, `2d`, `4d`, `8d`.
    pub fn exponential(initial_delay: Duration) -> Self {
        Self::Exponential {
            max_attempts: EXPONENTIAL_MAX_ATTEMPTS,
            initial_delay,
        }
    }

    /// Total attempts this policy allows, never less than one.
    pub fn max_attempts(&self) -> u32 {
        match *self {
            Self::Fixed { max_attempts, .. } | Self::Exponential { max_attempts, .. } => {
                max_attempts.max(1)
            }
        }
    }

    /// The delays slept between attempts, in order.
    ///
    /// Always one shorter than [`max_attempts`](Self::max_attempts).
    ///
    /// ```
    /// use std::time::Duration;
    /// use tollgate_rate_limit::RetryPolicy;
    ///
    /// let policy = RetryPolicy::exponential(Duration::from_millis(100));
    /// let delays: Vec<u64> = policy.delays().iter().map(|d| d.as_millis() as u64).collect();
    /// assert_eq!(delays, vec![100, 200, 400, 800]);
    /// ```
    pub fn delays(&self) -> Vec<Duration> {
        let retries = (self.max_attempts() - 1) as usize;
        match *self {
            Self::Fixed { delay, .. } => FixedInterval::new(delay).take(retries).collect(),
            Self::Exponential { initial_delay, .. } => {
                std::iter::successors(Some(initial_delay), |d| d.checked_mul(2))
                    .take(retries)
                    .collect()
            }
        }
    }
}

/// One attempt in a retry sequence, as seen by logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryAttempt {
    /// 1-based attempt number
    pub number: u32,
    /// Delay that will be slept before the next attempt, if there is one
    pub next_delay: Option<Duration>,
    /// Rendered error from this attempt
    pub error: String,
}

/// Runs a fallible async operation under a [`RetryPolicy`].
///
/// Errors whose [`RetryableError::is_retryable`] returns `false` end the
/// sequence immediately. When the budget runs out, the error from the final
/// attempt is returned as-is.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tollgate_error::{ProviderError, ProviderErrorKind};
/// use tollgate_rate_limit::{BackoffRetrier, RetryPolicy};
///
/// # tokio_test_block_on(async {
/// let retrier = BackoffRetrier::new(RetryPolicy::fixed(3, Duration::ZERO));
/// let result: Result<u32, ProviderError> = retrier.run(|| async { Ok(7) }).await;
/// assert_eq!(result.unwrap(), 7);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackoffRetrier {
    policy: RetryPolicy,
}

impl BackoffRetrier {
    /// Create a retrier for `policy`.
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// The policy this retrier follows.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invoke `attempt` until it succeeds, fails permanently, or the policy
    /// is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable error, or the error from the last
    /// attempt when every attempt failed.
    pub async fn run<F, Fut, T, E>(&self, mut attempt: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryableError + Display,
    {
        let delays = self.policy.delays();
        let max_attempts = self.policy.max_attempts();
        let mut number = 0u32;

        Retry::spawn(delays.clone(), || {
            number += 1;
            let this_attempt = number;
            let next_delay = delays.get(this_attempt as usize - 1).copied();
            let fut = attempt();

            async move {
                match fut.await {
                    Ok(value) => {
                        if this_attempt > 1 {
                            debug!(attempt = this_attempt, "Retry succeeded");
                        }
                        Ok(value)
                    }
                    Err(e) if !e.is_retryable() => {
                        warn!(attempt = this_attempt, error = %e, "Permanent error, not retrying");
                        Err(RetryError::Permanent(e))
                    }
                    Err(e) => {
                        let record = RetryAttempt {
                            number: this_attempt,
                            next_delay,
                            error: e.to_string(),
                        };
                        match record.next_delay {
                            Some(delay) => warn!(
                                attempt = record.number,
                                max_attempts,
                                delay_ms = delay.as_millis() as u64,
                                error = %record.error,
                                "Attempt failed, will retry"
                            ),
                            None => warn!(
                                attempt = record.number,
                                max_attempts,
                                error = %record.error,
                                "Attempt failed, retries exhausted"
                            ),
                        }
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    }
                }
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_policy_has_one_fewer_delay_than_attempts() {
        let policy = RetryPolicy::fixed(3, Duration::from_secs(1));
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delays(), vec![Duration::from_secs(1); 2]);
    }

    #[test]
    fn zero_attempts_means_one_try() {
        let policy = RetryPolicy::fixed(0, Duration::from_secs(1));
        assert_eq!(policy.max_attempts(), 1);
        assert!(policy.delays().is_empty());
    }
}
