//! The shared request pipeline.
//!
//! Every façade call ends up in [`Executor::execute_request`]: rate limit,
//! send, retry transient failures with linear backoff, then classify the
//! final response.

use std::future::Future;
use std::num::NonZeroU32;
use std::sync::{PoisonError, RwLock};

use http::HeaderValue;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;

use crate::config::{ClientConfig, ConfigError, authorization_header, normalize_endpoint};
use crate::context::Context;
use crate::time::{Sleeper, TokioSleeper};
use crate::transport::{HttpClient, HttpError, HttpRequest, HttpResponse};

use super::{ApiError, ApiRequest, Error, NetworkError, RateLimiter, RetryPolicy};

/// Anything that can run an [`ApiRequest`].
///
/// Façades depend only on this trait, which lets their tests script
/// responses without HTTP.
pub trait ApiExecutor: Send + Sync {
    /// Runs `request` and returns the body of a successful response.
    ///
    /// # Errors
    ///
    /// Returns the classified [`Error`] for the call.
    fn execute_request(
        &self,
        ctx: &Context,
        request: ApiRequest,
    ) -> impl Future<Output = Result<Vec<u8>, Error>> + Send;

    /// Runs `request` and decodes the JSON response into `T`.
    ///
    /// # Errors
    ///
    /// As [`ApiExecutor::execute_request`], plus [`Error::Decode`].
    fn execute<T: DeserializeOwned + Send>(
        &self,
        ctx: &Context,
        request: ApiRequest,
    ) -> impl Future<Output = Result<T, Error>> + Send {
        async move {
            let body = self.execute_request(ctx, request).await?;
            serde_json::from_slice(&body).map_err(Error::Decode)
        }
    }

    /// Runs `request` and ignores the response body.
    ///
    /// # Errors
    ///
    /// As [`ApiExecutor::execute_request`].
    fn execute_discarding(
        &self,
        ctx: &Context,
        request: ApiRequest,
    ) -> impl Future<Output = Result<(), Error>> + Send {
        async move {
            self.execute_request(ctx, request).await?;
            Ok(())
        }
    }
}

/// Endpoint and credentials, swappable while requests are in flight.
#[derive(Debug)]
struct Target {
    endpoint: String,
    token: String,
    authorization: HeaderValue,
}

/// Production executor over an [`HttpClient`].
///
/// # Type Parameters
///
/// - `H`: HTTP client implementation
/// - `S`: sleeper for retry backoff (defaults to [`TokioSleeper`])
#[derive(Debug)]
pub struct Executor<H, S = TokioSleeper> {
    http: H,
    sleeper: S,
    target: RwLock<Target>,
    retry_policy: RetryPolicy,
    limiter: RateLimiter,
    user_agent: HeaderValue,
    debug: bool,
}

impl<H> Executor<H, TokioSleeper> {
    /// Builds an executor from a client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration does not validate.
    pub fn new(config: &ClientConfig, http: H) -> Result<Self, ConfigError> {
        config.validate()?;

        let endpoint = normalize_endpoint(&config.endpoint)?;
        let authorization = authorization_header(&config.token)?;
        let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|e| {
            ConfigError::InvalidHeaderValue {
                name: USER_AGENT.to_string(),
                reason: e.to_string(),
            }
        })?;
        let rps = NonZeroU32::new(config.rate_limit.requests_per_second)
            .ok_or_else(|| ConfigError::invalid_rate_limit("requests_per_second"))?;
        let burst = NonZeroU32::new(config.rate_limit.burst_size)
            .ok_or_else(|| ConfigError::invalid_rate_limit("burst_size"))?;

        Ok(Self {
            http,
            sleeper: TokioSleeper,
            target: RwLock::new(Target {
                endpoint,
                token: config.token.clone(),
                authorization,
            }),
            retry_policy: RetryPolicy::new().with_retry_count(config.retry_count),
            limiter: RateLimiter::new(rps, burst),
            user_agent,
            debug: config.debug,
        })
    }
}

impl<H, S> Executor<H, S> {
    /// Replaces the backoff sleeper, mainly so tests skip real waits.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> Executor<H, S2> {
        Executor {
            http: self.http,
            sleeper,
            target: self.target,
            retry_policy: self.retry_policy,
            limiter: self.limiter,
            user_agent: self.user_agent,
            debug: self.debug,
        }
    }

    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Points subsequent requests at a new endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `endpoint` is not an http(s) URL.
    pub fn set_endpoint(&self, endpoint: &str) -> Result<(), ConfigError> {
        let endpoint = normalize_endpoint(endpoint)?;
        self.write_target(|t| t.endpoint = endpoint);
        Ok(())
    }

    /// Authenticates subsequent requests with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the token is empty or not a valid header value.
    pub fn set_token(&self, token: &str) -> Result<(), ConfigError> {
        let authorization = authorization_header(token)?;
        self.write_target(|t| {
            t.token = token.to_string();
            t.authorization = authorization;
        });
        Ok(())
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        self.read_target(|t| t.endpoint.clone())
    }

    #[must_use]
    pub fn token(&self) -> String {
        self.read_target(|t| t.token.clone())
    }

    /// The underlying transport.
    #[must_use]
    pub const fn http(&self) -> &H {
        &self.http
    }

    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    #[must_use]
    pub const fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    fn read_target<T>(&self, f: impl FnOnce(&Target) -> T) -> T {
        f(&self.target.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write_target(&self, f: impl FnOnce(&mut Target)) {
        f(&mut self.target.write().unwrap_or_else(PoisonError::into_inner));
    }
}

/// Transport errors and 5xx/429 responses are worth repeating.
fn should_retry(outcome: &Result<HttpResponse, HttpError>) -> bool {
    match outcome {
        Err(_) => true,
        Ok(response) => RetryPolicy::is_retryable_status(response.status),
    }
}

impl<H: HttpClient, S: Sleeper> Executor<H, S> {
    fn build_request(&self, request: &ApiRequest) -> Result<HttpRequest, Error> {
        let (raw_url, authorization) =
            self.read_target(|t| (format!("{}{}", t.endpoint, request.path), t.authorization.clone()));
        let url = url::Url::parse(&raw_url).map_err(|e| Error::InvalidUrl {
            url: raw_url,
            reason: e.to_string(),
        })?;

        let content_type = request
            .body
            .as_ref()
            .map_or("application/json", |b| b.content_type());
        let content_type = HeaderValue::from_str(content_type).map_err(|e| Error::InvalidHeader {
            name: CONTENT_TYPE.as_str(),
            reason: e.to_string(),
        })?;

        let mut http_request = HttpRequest::new(request.method.clone(), url)
            .with_header(AUTHORIZATION, authorization)
            .with_header(CONTENT_TYPE, content_type)
            .with_header(ACCEPT, HeaderValue::from_static("application/json"))
            .with_header(USER_AGENT, self.user_agent.clone());
        if let Some(body) = &request.body {
            if self.debug {
                tracing::debug!(body = %String::from_utf8_lossy(body.bytes()), "Request body");
            }
            http_request = http_request.with_body(body.bytes().to_vec());
        }
        Ok(http_request)
    }

    /// One rate-limited exchange; only context failures escape as `Err`.
    async fn attempt(
        &self,
        ctx: &Context,
        request: &HttpRequest,
    ) -> Result<Result<HttpResponse, HttpError>, Error> {
        self.limiter.acquire(ctx).await?;
        Ok(ctx.run(self.http.request(request.clone())).await?)
    }

    fn finish(&self, operation: &str, response: HttpResponse) -> Result<Vec<u8>, Error> {
        let status = response.status.as_u16();
        tracing::debug!(
            operation,
            status,
            content_type = response.header("content-type").unwrap_or("-"),
            "Response received"
        );
        if self.debug {
            tracing::debug!(body = %String::from_utf8_lossy(&response.body), "Response body");
        }

        if status >= 400 {
            return Err(ApiError::from_response(status, &response.body).into());
        }
        Ok(response.body)
    }
}

impl<H: HttpClient, S: Sleeper> ApiExecutor for Executor<H, S> {
    async fn execute_request(&self, ctx: &Context, request: ApiRequest) -> Result<Vec<u8>, Error> {
        let operation = request.operation();
        let http_request = self.build_request(&request)?;

        tracing::debug!(operation = %operation, "Sending request");
        let mut outcome = self.attempt(ctx, &http_request).await?;

        for retry in 1..self.retry_policy.max_attempts() {
            if !should_retry(&outcome) {
                break;
            }

            let delay = self.retry_policy.delay_for_retry(retry);
            match &outcome {
                Err(e) => tracing::warn!(
                    operation = %operation, retry, delay = ?delay, error = %e,
                    "Request failed, retrying"
                ),
                Ok(r) => tracing::warn!(
                    operation = %operation, retry, delay = ?delay, status = r.status.as_u16(),
                    "Transient status, retrying"
                ),
            }

            ctx.run(self.sleeper.sleep(delay)).await?;
            outcome = self.attempt(ctx, &http_request).await?;
        }

        match outcome {
            Ok(response) => self.finish(&operation, response),
            Err(source) => Err(NetworkError { operation, source }.into()),
        }
    }
}
