//! Transport-level failures.

use thiserror::Error;

/// Error type for a single HTTP exchange.
///
/// Describes what went wrong on the wire; whether to retry is decided by
/// the request executor.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Connection failed, or the body could not be read.
    ///
    /// Covers DNS failures, refused connections and resets.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server did not answer within the transport timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built from the given URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
