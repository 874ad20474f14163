//! Local webhook server state and per-delivery dispatch.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::defaults;

use super::signature::validate_signature;
use super::{EventType, WebhookError, WebhookEvent, WebhookHandler, server};

/// A running serve task and the token that stops it.
struct ServeHandle {
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct ServerState {
    port: u16,
    secret: String,
    handlers: HashMap<EventType, WebhookHandler>,
    running: bool,
    serve: Option<ServeHandle>,
}

struct Shared {
    state: RwLock<ServerState>,
    request_timeout: Duration,
    shutdown_timeout: Duration,
}

/// Receives webhook deliveries and dispatches them to handlers.
///
/// Cloning is cheap; clones share the same handlers, secret and server.
/// The lock guarding that state is never held across an `.await` or while
/// a handler runs.
#[derive(Clone)]
pub struct WebhookReceiver {
    inner: Arc<Shared>,
}

impl Default for WebhookReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WebhookReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("WebhookReceiver")
            .field("port", &state.port)
            .field("running", &state.running)
            .field("handlers", &state.handlers.len())
            .finish_non_exhaustive()
    }
}

impl WebhookReceiver {
    /// A stopped receiver with no handlers and no secret.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeouts(
            defaults::webhook_request_timeout(),
            defaults::webhook_shutdown_timeout(),
        )
    }

    /// Like [`WebhookReceiver::new`] with explicit server timeouts.
    #[must_use]
    pub fn with_timeouts(request_timeout: Duration, shutdown_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Shared {
                state: RwLock::new(ServerState::default()),
                request_timeout,
                shutdown_timeout,
            }),
        }
    }

    /// Sets the shared secret. An empty secret disables verification.
    pub fn set_secret(&self, secret: impl Into<String>) {
        self.write().secret = secret.into();
    }

    /// Installs `handler` for `event_type`, replacing any previous one.
    pub fn register_handler(&self, event_type: EventType, handler: WebhookHandler) {
        self.write().handlers.insert(event_type, handler);
    }

    pub fn unregister_handler(&self, event_type: &EventType) {
        self.write().handlers.remove(event_type);
    }

    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.read().handlers.len()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.read().running
    }

    /// Port the server is bound to; 0 until the first start.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.read().port
    }

    pub(super) fn request_timeout(&self) -> Duration {
        self.inner.request_timeout
    }

    /// Checks `signature` against the configured secret.
    #[must_use]
    pub fn validate_signature(&self, payload: &[u8], signature: &str) -> bool {
        let secret = self.read().secret.clone();
        validate_signature(payload, signature, &secret)
    }

    /// Decodes a delivery, verifies its signature and runs its handler.
    ///
    /// Decoding happens before the signature check, so a malformed body is
    /// reported as [`WebhookError::Decode`] even when it is also unsigned.
    ///
    /// # Errors
    ///
    /// - [`WebhookError::Decode`]: the body is not a valid event
    /// - [`WebhookError::InvalidSignature`]: the signature does not match
    /// - [`WebhookError::Handler`]: the handler failed; the error carries
    ///   the decoded event
    pub fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, WebhookError> {
        let event = WebhookEvent::from_slice(payload).map_err(WebhookError::Decode)?;

        if !self.validate_signature(payload, signature) {
            return Err(WebhookError::InvalidSignature);
        }

        let handler = self.read().handlers.get(&event.event_type).cloned();
        match handler.map(|h| h(&event)) {
            Some(Err(source)) => Err(WebhookError::Handler {
                event: Box::new(event),
                source,
            }),
            _ => Ok(event),
        }
    }

    /// Merges `handlers` into the registry and starts serving on `port`.
    ///
    /// Port 0 binds an ephemeral port. Returns the bound port.
    ///
    /// # Errors
    ///
    /// - [`WebhookError::AlreadyRunning`]: a server is already running
    /// - [`WebhookError::Bind`]: the listener could not be bound
    pub async fn start(
        &self,
        port: u16,
        handlers: HashMap<EventType, WebhookHandler>,
    ) -> Result<u16, WebhookError> {
        if self.is_running() {
            return Err(WebhookError::AlreadyRunning);
        }
        let (listener, bound_port) = bind(port).await?;

        // Running, port and serve handle change together so `stop` never
        // sees a running receiver without a task to stop.
        {
            let mut state = self.write();
            if state.running {
                return Err(WebhookError::AlreadyRunning);
            }
            let shutdown = CancellationToken::new();
            let app = server::router(self.clone());
            let signal = shutdown.clone().cancelled_owned();
            let task = tokio::spawn(async move {
                if let Err(e) = axum::serve(listener, app)
                    .with_graceful_shutdown(signal)
                    .await
                {
                    tracing::error!("Webhook server failed: {e}");
                }
            });
            state.handlers.extend(handlers);
            state.running = true;
            state.port = bound_port;
            state.serve = Some(ServeHandle { shutdown, task });
        }
        tracing::info!("Webhook server listening on port {bound_port}");
        Ok(bound_port)
    }

    /// Stops the server, waiting for in-flight requests.
    ///
    /// If graceful shutdown overruns its bound the serving task is aborted;
    /// the receiver is stopped either way.
    ///
    /// # Errors
    ///
    /// - [`WebhookError::NotRunning`]: no server is running
    /// - [`WebhookError::ShutdownTimeout`]: the serve task had to be aborted
    pub async fn stop(&self) -> Result<(), WebhookError> {
        let Some(handle) = self.write().serve.take() else {
            return Err(WebhookError::NotRunning);
        };

        handle.shutdown.cancel();
        let mut task = handle.task;
        let limit = self.inner.shutdown_timeout;
        let result = if tokio::time::timeout(limit, &mut task).await.is_ok() {
            Ok(())
        } else {
            tracing::warn!("Webhook server did not drain within {limit:?}, aborting");
            task.abort();
            Err(WebhookError::ShutdownTimeout(limit))
        };

        self.write().running = false;
        tracing::info!("Webhook server stopped");
        result
    }

    fn read(&self) -> RwLockReadGuard<'_, ServerState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ServerState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

async fn bind(port: u16) -> Result<(TcpListener, u16), WebhookError> {
    let to_error = |source| WebhookError::Bind { port, source };
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .await
        .map_err(to_error)?;
    let bound = listener.local_addr().map_err(to_error)?.port();
    Ok((listener, bound))
}
