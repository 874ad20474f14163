//! Error taxonomy for outbound API calls.
//!
//! Four families reach callers: local [`ValidationErrors`], transport
//! [`NetworkError`]s, classified [`ApiError`]s for non-2xx responses, and
//! JSON decode/encode failures. Cancellation is reported separately so it
//! is never mistaken for a network problem.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::context::ContextError;
use crate::transport::HttpError;

/// Extension trait for checking if an error is transient.
pub trait IsRetryable {
    /// Returns true if repeating the operation may succeed.
    fn is_retryable(&self) -> bool;
}

/// Category of a non-2xx API response, derived only from the status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    BadRequest,
    Authentication,
    Authorization,
    NotFound,
    MethodNotAllowed,
    RateLimit,
    ServerError,
    ClientError,
    Unknown,
}

impl ErrorCategory {
    /// Status codes with a dedicated category.
    const TABLE: [(u16, Self); 7] = [
        (400, Self::BadRequest),
        (401, Self::Authentication),
        (403, Self::Authorization),
        (404, Self::NotFound),
        (405, Self::MethodNotAllowed),
        (429, Self::RateLimit),
        (500, Self::ServerError),
    ];

    /// Classifies a status code.
    ///
    /// Codes missing from the table fall into `ServerError` (>= 500),
    /// `ClientError` (>= 400) or `Unknown`.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        if let Some((_, category)) = Self::TABLE.iter().find(|(code, _)| *code == status) {
            return *category;
        }
        match status {
            500.. => Self::ServerError,
            400.. => Self::ClientError,
            _ => Self::Unknown,
        }
    }

    /// Wire name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::NotFound => "not_found",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::RateLimit => "rate_limit",
            Self::ServerError => "server_error",
            Self::ClientError => "client_error",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IsRetryable for ErrorCategory {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit | Self::ServerError)
    }
}

/// A non-2xx response from the API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("WATI API Error {status}: {message}")]
pub struct ApiError {
    /// HTTP status code
    pub status: u16,
    /// Message extracted from the response
    pub message: String,
    /// Category derived from `status`
    pub category: ErrorCategory,
}

/// Error envelope returned by the API.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    /// Creates an error whose category follows from `status`.
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            category: ErrorCategory::from_status(status),
        }
    }

    /// Builds an error from a response body.
    ///
    /// Prefers a non-empty `error` field, then `message`, then the raw body.
    #[must_use]
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed = serde_json::from_slice::<ErrorBody>(body).ok();
        let message = parsed
            .and_then(|b| {
                b.error
                    .filter(|s| !s.is_empty())
                    .or_else(|| b.message.filter(|s| !s.is_empty()))
            })
            .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());
        Self::new(status, message)
    }

    /// The token was rejected.
    #[must_use]
    pub fn invalid_token() -> Self {
        Self::new(401, "Invalid API token")
    }

    /// A resource lookup found nothing.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    #[must_use]
    pub const fn is_authentication_error(&self) -> bool {
        self.status == 401
    }

    #[must_use]
    pub const fn is_authorization_error(&self) -> bool {
        self.status == 403
    }

    #[must_use]
    pub const fn is_not_found_error(&self) -> bool {
        self.status == 404
    }

    #[must_use]
    pub const fn is_rate_limit_error(&self) -> bool {
        self.status == 429
    }

    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

impl IsRetryable for ApiError {
    fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}

/// Transport failure after all attempts were spent.
#[derive(Debug, Error)]
#[error("Network error during {operation}: {source}")]
pub struct NetworkError {
    /// `"<METHOD> <path>"` of the failed call
    pub operation: String,
    /// Last transport error observed
    #[source]
    pub source: HttpError,
}

impl IsRetryable for NetworkError {
    fn is_retryable(&self) -> bool {
        true
    }
}

/// A single field that failed local validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation error for field '{field}': {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every validation failure found in one request payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Records a failure for `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError::new(field, message));
    }

    /// Records `message` for `field` when `failed` holds.
    pub fn check(&mut self, failed: bool, field: impl Into<String>, message: impl Into<String>) {
        if failed {
            self.add(field, message);
        }
    }

    /// Appends every error from `other`.
    pub fn extend(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if at least one failure was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.has_errors() { Err(self) } else { Ok(()) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => f.write_str("No validation errors"),
            [single] => single.fmt(f),
            many => write!(f, "Multiple validation errors: {} errors", many.len()),
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IsRetryable for ValidationErrors {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Error returned by every outbound operation.
#[derive(Debug, Error)]
pub enum Error {
    /// The payload failed local checks; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// A success response did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid {name} header: {reason}")]
    InvalidHeader { name: &'static str, reason: String },

    /// The platform reported that processing an uploaded file failed.
    #[error("media processing failed for file: {0}")]
    MediaFailed(String),

    /// An uploaded file did not become ready within the polling budget.
    #[error("timeout waiting for media to be ready: {0}")]
    MediaTimeout(String),

    /// The caller's context was cancelled or expired.
    #[error(transparent)]
    Cancelled(#[from] ContextError),
}

impl From<ValidationError> for Error {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error.into())
    }
}

impl Error {
    /// The classified API error, if this is one.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }

    /// Category of a classified API error.
    #[must_use]
    pub fn category(&self) -> Option<ErrorCategory> {
        self.api_error().map(|e| e.category)
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_retryable(),
            Self::Api(e) => e.is_retryable(),
            Self::Validation(e) => e.is_retryable(),
            Self::Decode(_)
            | Self::Encode(_)
            | Self::InvalidUrl { .. }
            | Self::InvalidHeader { .. }
            | Self::MediaFailed(_)
            | Self::MediaTimeout(_)
            | Self::Cancelled(_) => false,
        }
    }
}
