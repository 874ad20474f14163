//! Library-level client configuration.

use std::time::Duration;

use http::HeaderValue;
use serde::{Deserialize, Serialize};

use super::defaults;
use super::error::{ConfigError, field};

/// Token bucket parameters for outbound calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Tokens added per second
    pub requests_per_second: u32,
    /// Bucket capacity
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: defaults::RATE_LIMIT_REQUESTS_PER_SECOND,
            burst_size: defaults::RATE_LIMIT_BURST_SIZE,
        }
    }
}

/// Settings for one [`Client`](crate::Client).
///
/// `ClientConfig::default()` yields the built-in defaults with an empty
/// endpoint and token; [`ClientConfig::new`] fills those in. Values are
/// checked when the client is built.
///
/// # Example
///
/// ```
/// use wati::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new("https://live-server.wati.io/", "token")
///     .with_timeout(Duration::from_secs(10))
///     .with_retry_count(5)
///     .with_rate_limit(5, 10);
///
/// assert_eq!(config.endpoint, "https://live-server.wati.io");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL without trailing slash
    pub endpoint: String,
    /// Bearer token
    pub token: String,
    /// Per-attempt HTTP timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub retry_count: u32,
    /// Outbound pacing
    pub rate_limit: RateLimitConfig,
    /// User-Agent header value
    pub user_agent: String,
    /// Log request and response bodies at debug level
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            token: String::new(),
            timeout: defaults::timeout(),
            retry_count: defaults::RETRY_COUNT,
            rate_limit: RateLimitConfig::default(),
            user_agent: defaults::USER_AGENT.to_string(),
            debug: false,
        }
    }
}

impl ClientConfig {
    /// Defaults plus endpoint and token. One trailing `/` is dropped.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            endpoint: strip_trailing_slash(&endpoint).to_string(),
            token: token.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    #[must_use]
    pub const fn with_rate_limit(mut self, requests_per_second: u32, burst_size: u32) -> Self {
        self.rate_limit = RateLimitConfig {
            requests_per_second,
            burst_size,
        };
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: bad endpoint, empty token, zero
    /// timeout, zero rate-limit values or an unusable user agent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_endpoint(&self.endpoint)?;
        authorization_header(&self.token)?;

        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidDuration {
                field: "timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.rate_limit.requests_per_second == 0 {
            return Err(ConfigError::invalid_rate_limit("requests_per_second"));
        }
        if self.rate_limit.burst_size == 0 {
            return Err(ConfigError::invalid_rate_limit("burst_size"));
        }
        HeaderValue::from_str(&self.user_agent).map_err(|e| ConfigError::InvalidHeaderValue {
            name: "user-agent".to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

fn strip_trailing_slash(endpoint: &str) -> &str {
    endpoint.strip_suffix('/').unwrap_or(endpoint)
}

/// Validates an endpoint and drops one trailing `/`.
///
/// # Errors
///
/// Returns an error unless `endpoint` is an absolute http(s) URL.
pub fn normalize_endpoint(endpoint: &str) -> Result<String, ConfigError> {
    let trimmed = strip_trailing_slash(endpoint.trim());
    if trimmed.is_empty() {
        return Err(ConfigError::missing(
            field::ENDPOINT,
            "Set the API endpoint, e.g. https://live-server-12345.wati.io",
        ));
    }

    let url = url::Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl {
        url: endpoint.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: endpoint.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(trimmed.to_string())
}

/// Builds the `Authorization: Bearer` value for `token`.
///
/// # Errors
///
/// Returns an error if the token is empty or contains bytes not allowed
/// in a header.
pub fn authorization_header(token: &str) -> Result<HeaderValue, ConfigError> {
    if token.is_empty() {
        return Err(ConfigError::missing(
            field::TOKEN,
            "Provide the bearer token from the WATI dashboard",
        ));
    }
    let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
        ConfigError::InvalidHeaderValue {
            name: "authorization".to_string(),
            reason: e.to_string(),
        }
    })?;
    value.set_sensitive(true);
    Ok(value)
}
