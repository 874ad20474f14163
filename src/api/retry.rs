//! Retry policy for outbound API calls.

use std::time::Duration;

/// Linear backoff retry configuration.
///
/// A call makes at most `retry_count + 1` attempts. Retry `n` (1-based)
/// waits `n * backoff_step` first, so the defaults wait 1s, 2s, 3s.
///
/// # Example
///
/// ```
/// use wati::api::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new().with_retry_count(2);
/// assert_eq!(policy.max_attempts(), 3);
/// assert_eq!(policy.delay_for_retry(2), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero disables retrying.
    pub retry_count: u32,

    /// Unit of the linear backoff.
    pub backoff_step: Duration,
}

impl RetryPolicy {
    /// Default number of retries.
    pub const DEFAULT_RETRY_COUNT: u32 = 3;

    /// Default backoff unit (1 second).
    pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_secs(1);

    #[must_use]
    pub const fn new() -> Self {
        Self {
            retry_count: Self::DEFAULT_RETRY_COUNT,
            backoff_step: Self::DEFAULT_BACKOFF_STEP,
        }
    }

    #[must_use]
    pub const fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Sets the backoff unit. Zero is allowed and yields immediate retries.
    #[must_use]
    pub const fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    /// Total attempts including the first one.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.retry_count.saturating_add(1)
    }

    /// Wait before retry number `retry` (1 = first retry).
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.backoff_step.saturating_mul(retry)
    }

    /// Whether a response with `status` may succeed when repeated.
    ///
    /// True for 5xx and 429.
    #[must_use]
    pub fn is_retryable_status(status: http::StatusCode) -> bool {
        status.is_server_error() || status == http::StatusCode::TOO_MANY_REQUESTS
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}
