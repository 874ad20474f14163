//! Errors raised on the receiving side of webhooks.

use std::time::Duration;

use thiserror::Error;

use crate::context::ContextError;
use crate::transport::HttpError;

use super::{BoxError, WebhookEvent};

/// Error type for webhook reception, dispatch and receiver lifecycle.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The delivery body is not a valid event.
    #[error("error parsing webhook event: {0}")]
    Decode(#[source] serde_json::Error),

    /// The signature does not match the configured secret.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// The registered handler failed. The event was still received.
    #[error("handler for {} event failed: {source}", event.event_type)]
    Handler {
        event: Box<WebhookEvent>,
        #[source]
        source: BoxError,
    },

    #[error("webhook server is already running")]
    AlreadyRunning,

    #[error("webhook server is not running")]
    NotRunning,

    #[error("failed to bind webhook server on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Graceful shutdown did not finish in time; the server was aborted.
    #[error("webhook server did not shut down within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("failed to encode test event: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("error sending test webhook: {0}")]
    TestDelivery(#[source] HttpError),

    #[error("webhook test failed with status: {0}")]
    TestRejected(u16),

    #[error(transparent)]
    Cancelled(#[from] ContextError),
}

impl WebhookError {
    /// The decoded event, when the failure happened after decoding.
    #[must_use]
    pub fn event(&self) -> Option<&WebhookEvent> {
        match self {
            Self::Handler { event, .. } => Some(event),
            _ => None,
        }
    }
}
