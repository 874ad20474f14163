//! Token-bucket limiter shared by every call made through one client.

use std::num::NonZeroU32;

use governor::{DefaultDirectRateLimiter, Quota};

use crate::context::{Context, ContextError};

/// Token bucket refilled at `requests_per_second`, holding up to `burst`.
///
/// Waiting is timer based, never a spin, and gives up as soon as the
/// caller's [`Context`] is done.
pub struct RateLimiter {
    inner: DefaultDirectRateLimiter,
    requests_per_second: NonZeroU32,
    burst: NonZeroU32,
}

impl RateLimiter {
    #[must_use]
    pub fn new(requests_per_second: NonZeroU32, burst: NonZeroU32) -> Self {
        let quota = Quota::per_second(requests_per_second).allow_burst(burst);
        Self {
            inner: governor::RateLimiter::direct(quota),
            requests_per_second,
            burst,
        }
    }

    /// Waits for one token.
    ///
    /// # Errors
    ///
    /// Returns the context error if `ctx` finishes first.
    pub async fn acquire(&self, ctx: &Context) -> Result<(), ContextError> {
        ctx.run(self.inner.until_ready()).await
    }

    #[must_use]
    pub const fn requests_per_second(&self) -> NonZeroU32 {
        self.requests_per_second
    }

    #[must_use]
    pub const fn burst(&self) -> NonZeroU32 {
        self.burst
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("requests_per_second", &self.requests_per_second)
            .field("burst", &self.burst)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[tokio::test]
    async fn burst_is_available_immediately() {
        let limiter = RateLimiter::new(nz(1), nz(5));
        let ctx = Context::background();
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire(&ctx).await.unwrap();
        }
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn refill_paces_requests_beyond_burst() {
        let limiter = RateLimiter::new(nz(2), nz(1));
        let ctx = Context::background();
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire(&ctx).await.unwrap();
        }
        assert!(start.elapsed() >= Duration::from_millis(900));
    }

    #[tokio::test]
    async fn cancelled_context_aborts_wait() {
        let limiter = RateLimiter::new(nz(1), nz(1));
        let ctx = Context::background();
        limiter.acquire(&ctx).await.unwrap();

        let waiting = Context::with_timeout(Duration::from_millis(100));
        let start = Instant::now();
        let result = limiter.acquire(&waiting).await;

        assert_eq!(result, Err(ContextError::DeadlineExceeded));
        assert!(start.elapsed() < Duration::from_millis(800));
    }
}
