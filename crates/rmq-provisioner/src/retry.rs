//! Exponential backoff retry logic for management API calls.

use crate::error::{AdminApiError, AdminApiResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Suspends the current task between retry attempts.
///
/// Production code uses [`TokioSleeper`]; tests inject an implementation that
/// records the requested delays and returns immediately.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles after each further failure.
    pub base_delay: Duration,
    /// Maximum delay cap.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget and base delay.
    /// The maximum delay cap defaults to 60 seconds.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: Duration::from_secs(60),
        }
    }

    /// Whether a failure on the given 0-based attempt should be followed by another attempt.
    #[must_use]
    pub fn should_retry(&self, attempt: u32, error: &AdminApiError) -> bool {
        attempt + 1 < self.max_attempts && error.is_retryable()
    }

    /// Delay to wait after the given 0-based attempt failed: `base * 2^attempt`, capped.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Execute an async operation with retry.
    ///
    /// The closure `f` is called until it succeeds, returns a non-retryable
    /// error, or the attempt budget is spent. Retryable failures that exhaust
    /// the budget are reported as [`AdminApiError::MaxRetriesExceeded`].
    pub async fn execute<F, Fut, T>(
        &self,
        sleeper: &dyn Sleeper,
        operation_name: &str,
        mut f: F,
    ) -> AdminApiResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = AdminApiResult<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match f().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(
                            operation = operation_name,
                            attempt = attempt + 1,
                            "Operation succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if !error.is_retryable() {
                        return Err(error);
                    }

                    if !self.should_retry(attempt, &error) {
                        warn!(
                            operation = operation_name,
                            attempts = attempt + 1,
                            error = %error,
                            "Max attempts exceeded"
                        );
                        return Err(AdminApiError::MaxRetriesExceeded {
                            attempts: attempt + 1,
                            message: format!(
                                "{operation_name} failed after {} attempt(s): {error}",
                                attempt + 1
                            ),
                        });
                    }

                    let delay = self.delay_for(attempt);
                    debug!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        delay_secs = delay.as_secs_f64(),
                        error = %error,
                        "Retrying after transient error"
                    );

                    sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
