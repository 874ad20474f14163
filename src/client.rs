//! The top-level API client.
//!
//! [`Client`] owns one [`Executor`] and hands out the resource façades,
//! all sharing it. Endpoint and token can be swapped at runtime; the next
//! request on any façade picks up the change.

use std::sync::Arc;

use crate::api::{ApiError, ApiExecutor, ApiRequest, Error, Executor, TokenResponse};
use crate::chatbots::ChatbotsService;
use crate::config::{ClientConfig, ConfigError};
use crate::contacts::ContactsService;
use crate::context::Context;
use crate::media::MediaService;
use crate::messages::MessagesService;
use crate::time::{Sleeper, TokioSleeper};
use crate::transport::{HttpClient, ReqwestClient};
use crate::webhooks::{WebhookError, WebhookService, send_test_event};

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

/// Entry point to the platform API.
///
/// # Type Parameters
///
/// - `H`: HTTP transport (defaults to [`ReqwestClient`])
/// - `S`: retry backoff sleeper (defaults to [`TokioSleeper`])
///
/// # Example
///
/// ```no_run
/// use wati::{Client, ClientConfig, Context};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new(ClientConfig::new("https://live-server.wati.io", "token"))?;
/// let ctx = Context::background();
///
/// client.validate_token(&ctx).await?;
/// let bots = client.chatbots().get_active_chatbots(&ctx).await?;
/// println!("{} active chatbots", bots.len());
/// # Ok(())
/// # }
/// ```
pub struct Client<H = ReqwestClient, S = TokioSleeper> {
    executor: Arc<Executor<H, S>>,
    config: ClientConfig,
    contacts: ContactsService<Executor<H, S>>,
    messages: MessagesService<Executor<H, S>>,
    chatbots: ChatbotsService<Executor<H, S>>,
    media: MediaService<Executor<H, S>>,
    webhooks: WebhookService<Executor<H, S>>,
}

impl<H, S> std::fmt::Debug for Client<H, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.executor.endpoint())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Builds a client over a reqwest transport using `config.timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration does not validate or
    /// the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let http = ReqwestClient::with_timeout(config.timeout).map_err(ConfigError::HttpClient)?;
        Self::with_transport(config, http, TokioSleeper)
    }
}

impl<H, S> Client<H, S> {
    /// Builds a client over a caller-supplied transport and sleeper.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration does not validate.
    pub fn with_transport(config: ClientConfig, http: H, sleeper: S) -> Result<Self, ConfigError> {
        let executor = Arc::new(Executor::new(&config, http)?.with_sleeper(sleeper));
        Ok(Self {
            contacts: ContactsService::new(Arc::clone(&executor)),
            messages: MessagesService::new(Arc::clone(&executor)),
            chatbots: ChatbotsService::new(Arc::clone(&executor)),
            media: MediaService::new(Arc::clone(&executor)),
            webhooks: WebhookService::new(Arc::clone(&executor)),
            executor,
            config,
        })
    }

    /// Points every façade at a new endpoint. One trailing `/` is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `endpoint` is not an http(s) URL.
    pub fn set_endpoint(&self, endpoint: &str) -> Result<(), ConfigError> {
        self.executor.set_endpoint(endpoint)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if the token is empty or not a valid header value.
    pub fn set_token(&self, token: &str) -> Result<(), ConfigError> {
        self.executor.set_token(token)
    }

    /// Current settings, including any endpoint or token swapped in since
    /// construction.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.executor.endpoint(),
            token: self.executor.token(),
            ..self.config.clone()
        }
    }

    #[must_use]
    pub const fn executor(&self) -> &Arc<Executor<H, S>> {
        &self.executor
    }

    #[must_use]
    pub const fn contacts(&self) -> &ContactsService<Executor<H, S>> {
        &self.contacts
    }

    #[must_use]
    pub const fn messages(&self) -> &MessagesService<Executor<H, S>> {
        &self.messages
    }

    #[must_use]
    pub const fn chatbots(&self) -> &ChatbotsService<Executor<H, S>> {
        &self.chatbots
    }

    #[must_use]
    pub const fn media(&self) -> &MediaService<Executor<H, S>> {
        &self.media
    }

    #[must_use]
    pub const fn webhooks(&self) -> &WebhookService<Executor<H, S>> {
        &self.webhooks
    }
}

impl<H: HttpClient, S: Sleeper> Client<H, S> {
    /// Runs a raw request through the shared pipeline and returns the
    /// success body.
    ///
    /// # Errors
    ///
    /// As [`ApiExecutor::execute_request`].
    pub async fn execute_request(&self, ctx: &Context, request: ApiRequest) -> Result<Vec<u8>, Error> {
        self.executor.execute_request(ctx, request).await
    }

    /// Checks the token with a cheap authenticated call.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::invalid_token`] when the platform rejects the
    /// token, otherwise the executor's error.
    pub async fn validate_token(&self, ctx: &Context) -> Result<(), Error> {
        match self
            .executor
            .execute_discarding(ctx, ApiRequest::get("/api/v1/chatbots"))
            .await
        {
            Err(Error::Api(e)) if e.is_authentication_error() => {
                Err(ApiError::invalid_token().into())
            }
            other => other,
        }
    }

    /// Asks the platform for a new token and switches to it.
    ///
    /// # Errors
    ///
    /// Returns the executor's error, or [`Error::InvalidHeader`] if the
    /// returned token cannot be sent as a header.
    pub async fn rotate_token(&self, ctx: &Context) -> Result<TokenResponse, Error> {
        let response: TokenResponse = self
            .executor
            .execute(ctx, ApiRequest::post("/api/v1/rotateToken"))
            .await?;
        if !response.token.is_empty() {
            self.executor
                .set_token(&response.token)
                .map_err(|e| Error::InvalidHeader {
                    name: "authorization",
                    reason: e.to_string(),
                })?;
            tracing::info!("API token rotated");
        }
        Ok(response)
    }

    /// Posts a sample `message_received` event to a receiver at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::TestRejected`] unless the receiver answers
    /// 200.
    pub async fn test_webhook(&self, ctx: &Context, url: &str) -> Result<(), WebhookError> {
        send_test_event(self.executor.http(), ctx, url).await
    }
}
