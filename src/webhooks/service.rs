//! Webhook façade: remote registration plus the local receiver.

use std::collections::HashMap;
use std::sync::Arc;

use http::{HeaderValue, StatusCode};
use http::header::CONTENT_TYPE;

use crate::api::{ApiExecutor, ApiRequest, BaseResponse, Error, ValidationError};
use crate::context::Context;
use crate::transport::{HttpClient, HttpError, HttpRequest};

use super::{
    EventType, WebhookConfig, WebhookError, WebhookEvent, WebhookHandler, WebhookReceiver,
    WebhookRegistration, WebhooksResponse,
};

const WEBHOOKS_PATH: &str = "/api/v1/webhooks";

/// Registers webhooks with the platform and receives their deliveries.
pub struct WebhookService<E> {
    executor: Arc<E>,
    receiver: WebhookReceiver,
}

impl<E> Clone for WebhookService<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            receiver: self.receiver.clone(),
        }
    }
}

impl<E> std::fmt::Debug for WebhookService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookService")
            .field("receiver", &self.receiver)
            .finish_non_exhaustive()
    }
}

impl<E> WebhookService<E> {
    #[must_use]
    pub fn new(executor: Arc<E>) -> Self {
        Self::with_receiver(executor, WebhookReceiver::new())
    }

    #[must_use]
    pub const fn with_receiver(executor: Arc<E>, receiver: WebhookReceiver) -> Self {
        Self { executor, receiver }
    }

    /// The local receiver backing this service.
    #[must_use]
    pub const fn receiver(&self) -> &WebhookReceiver {
        &self.receiver
    }

    /// See [`WebhookReceiver::handle_webhook`].
    ///
    /// # Errors
    ///
    /// As [`WebhookReceiver::handle_webhook`].
    pub fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, WebhookError> {
        self.receiver.handle_webhook(payload, signature)
    }

    #[must_use]
    pub fn validate_webhook_signature(&self, payload: &[u8], signature: &str) -> bool {
        self.receiver.validate_signature(payload, signature)
    }

    /// See [`WebhookReceiver::start`].
    ///
    /// # Errors
    ///
    /// As [`WebhookReceiver::start`].
    pub async fn start_server(
        &self,
        port: u16,
        handlers: HashMap<EventType, WebhookHandler>,
    ) -> Result<u16, WebhookError> {
        self.receiver.start(port, handlers).await
    }

    /// See [`WebhookReceiver::stop`].
    ///
    /// # Errors
    ///
    /// As [`WebhookReceiver::stop`].
    pub async fn stop_server(&self) -> Result<(), WebhookError> {
        self.receiver.stop().await
    }

    pub fn register_handler(&self, event_type: EventType, handler: WebhookHandler) {
        self.receiver.register_handler(event_type, handler);
    }

    pub fn unregister_handler(&self, event_type: &EventType) {
        self.receiver.unregister_handler(event_type);
    }

    pub fn set_secret(&self, secret: impl Into<String>) {
        self.receiver.set_secret(secret);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.receiver.is_running()
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.receiver.port()
    }

    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.receiver.handler_count()
    }

    /// Installs the common message handlers.
    ///
    /// `on_received` covers both `message_received` and
    /// `new_contact_message`. Build them with
    /// [`super::message_handler`] and [`super::message_status_handler`].
    pub fn register_message_handlers(
        &self,
        on_received: Option<WebhookHandler>,
        on_delivered: Option<WebhookHandler>,
        on_read: Option<WebhookHandler>,
    ) {
        if let Some(handler) = on_received {
            self.register_handler(EventType::MessageReceived, Arc::clone(&handler));
            self.register_handler(EventType::NewContactMessage, handler);
        }
        if let Some(handler) = on_delivered {
            self.register_handler(EventType::MessageDelivered, handler);
        }
        if let Some(handler) = on_read {
            self.register_handler(EventType::MessageRead, handler);
        }
    }

    /// Installs `handler` for every known event type.
    pub fn register_all_event_handlers(&self, handler: &WebhookHandler) {
        for event_type in EventType::ALL {
            self.register_handler(event_type, Arc::clone(handler));
        }
    }
}

impl<E: ApiExecutor> WebhookService<E> {
    /// Registers `url` for `events` with no secret or description.
    ///
    /// # Errors
    ///
    /// As [`WebhookService::register_webhook_with_config`].
    pub async fn register_webhook(
        &self,
        ctx: &Context,
        url: &str,
        events: Vec<EventType>,
    ) -> Result<(), Error> {
        self.register_webhook_with_config(ctx, &WebhookRegistration::new(url, events))
            .await
    }

    /// Validates and submits a registration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] before any request if the registration
    /// is incomplete, otherwise the executor's error.
    pub async fn register_webhook_with_config(
        &self,
        ctx: &Context,
        registration: &WebhookRegistration,
    ) -> Result<(), Error> {
        registration.validate()?;
        let request = ApiRequest::post(WEBHOOKS_PATH).json(registration)?;
        self.executor
            .execute::<BaseResponse>(ctx, request)
            .await
            .map(drop)
    }

    /// Removes the registration for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty URL, otherwise the
    /// executor's error.
    pub async fn unregister_webhook(&self, ctx: &Context, url: &str) -> Result<(), Error> {
        if url.trim().is_empty() {
            return Err(ValidationError::new("url", "webhook URL is required").into());
        }
        let request = ApiRequest::delete(WEBHOOKS_PATH).json(&serde_json::json!({ "url": url }))?;
        self.executor
            .execute::<BaseResponse>(ctx, request)
            .await
            .map(drop)
    }

    /// Lists the webhooks registered for this account.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn list_webhooks(&self, ctx: &Context) -> Result<Vec<WebhookConfig>, Error> {
        let response: WebhooksResponse = self
            .executor
            .execute(ctx, ApiRequest::get(WEBHOOKS_PATH))
            .await?;
        Ok(response.webhooks)
    }
}

/// Posts a sample `message_received` event to `url`.
///
/// The delivery is unsigned and must be answered with exactly 200.
///
/// # Errors
///
/// - [`WebhookError::TestDelivery`]: the URL is invalid or unreachable
/// - [`WebhookError::TestRejected`]: the receiver answered with another status
/// - [`WebhookError::Cancelled`]: `ctx` ended first
pub async fn send_test_event<H: HttpClient>(
    http: &H,
    ctx: &Context,
    url: &str,
) -> Result<(), WebhookError> {
    let target = url::Url::parse(url)
        .map_err(|e| WebhookError::TestDelivery(HttpError::InvalidUrl(format!("{url}: {e}"))))?;
    let payload = serde_json::to_vec(&WebhookEvent::test_message(chrono::Utc::now()))
        .map_err(WebhookError::Encode)?;

    let request = HttpRequest::post(target)
        .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .with_body(payload);
    let response = ctx
        .run(http.request(request))
        .await?
        .map_err(WebhookError::TestDelivery)?;

    if response.status == StatusCode::OK {
        Ok(())
    } else {
        Err(WebhookError::TestRejected(response.status.as_u16()))
    }
}
