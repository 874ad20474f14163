//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default per-request timeout in seconds.
pub const TIMEOUT_SECS: u64 = 30;

/// Default number of retries after the first attempt.
pub const RETRY_COUNT: u32 = 3;

/// Default token refill rate.
pub const RATE_LIMIT_REQUESTS_PER_SECOND: u32 = 10;

/// Default token bucket capacity.
pub const RATE_LIMIT_BURST_SIZE: u32 = 20;

/// User-Agent sent with every API call.
pub const USER_AGENT: &str = concat!("wati-sdk/", env!("CARGO_PKG_VERSION"));

/// Default port of the webhook receiver.
pub const WEBHOOK_PORT: u16 = 8080;

/// Request timeout on the webhook receiver, in seconds.
pub const WEBHOOK_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Upper bound on a graceful receiver shutdown, in seconds.
pub const WEBHOOK_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Page size used when a list call does not specify one.
pub const PAGE_SIZE: u32 = 20;

/// Page size used when walking every page of contacts.
pub const ALL_CONTACTS_PAGE_SIZE: u32 = 50;

/// Largest batch accepted by bulk endpoints.
pub const MAX_BULK_ITEMS: usize = 100;

/// Interval between media status polls.
pub const MEDIA_POLL_INTERVAL_SECS: u64 = 1;

/// Default per-request timeout as Duration.
#[must_use]
pub const fn timeout() -> Duration {
    Duration::from_secs(TIMEOUT_SECS)
}

/// Webhook receiver request timeout as Duration.
#[must_use]
pub const fn webhook_request_timeout() -> Duration {
    Duration::from_secs(WEBHOOK_REQUEST_TIMEOUT_SECS)
}

/// Webhook receiver shutdown bound as Duration.
#[must_use]
pub const fn webhook_shutdown_timeout() -> Duration {
    Duration::from_secs(WEBHOOK_SHUTDOWN_TIMEOUT_SECS)
}

/// Media status poll interval as Duration.
#[must_use]
pub const fn media_poll_interval() -> Duration {
    Duration::from_secs(MEDIA_POLL_INTERVAL_SECS)
}
