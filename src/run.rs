//! Application execution logic.
//!
//! Starts the webhook receiver, optionally registers its public URL with
//! the platform, and serves until a shutdown signal arrives.

use std::collections::HashMap;

use thiserror::Error;
use tokio::signal;

use wati::config::{ConfigError, ValidatedConfig};
use wati::webhooks::{WebhookError, WebhookEvent, WebhookHandler, WebhookRegistration, handler};
use wati::{Client, Context};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The API client could not be built.
    #[error("Failed to create API client: {0}")]
    Client(#[source] ConfigError),

    /// The receiver failed to start or stop.
    #[error("Webhook receiver error: {0}")]
    Receiver(#[from] WebhookError),

    /// The platform refused the webhook registration.
    #[error("Failed to register webhook: {0}")]
    Registration(#[source] wati::Error),
}

/// Executes the daemon.
///
/// 1. Builds the API client and installs a logging handler for every event
/// 2. Starts the receiver on the configured port
/// 3. Registers `public_url` with the platform, if configured
/// 4. Waits for Ctrl+C / SIGTERM, then unregisters and stops
///
/// # Errors
///
/// Returns an error if the client cannot be built, the port cannot be
/// bound, or the registration is rejected.
///
/// Excluded from coverage - requires signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let client = Client::new(config.client.clone()).map_err(RunError::Client)?;
    let webhooks = client.webhooks();

    if let Some(secret) = &config.webhook.secret {
        webhooks.set_secret(secret.clone());
    }
    webhooks.register_all_event_handlers(&log_handler());

    let port = webhooks
        .start_server(config.webhook.port, HashMap::new())
        .await?;
    tracing::info!("Receiving webhooks on port {port}");

    let ctx = Context::with_timeout(config.client.timeout);
    let registration = registration(&config);
    if let Some(reg) = &registration {
        if let Err(e) = webhooks.register_webhook_with_config(&ctx, reg).await {
            stop_quietly(&client).await;
            return Err(RunError::Registration(e));
        }
        tracing::info!(url = %reg.url, events = reg.events.len(), "Webhook registered");
    }

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping...");

    if let Some(reg) = &registration {
        let ctx = Context::with_timeout(config.client.timeout);
        match webhooks.unregister_webhook(&ctx, &reg.url).await {
            Ok(()) => tracing::info!(url = %reg.url, "Webhook unregistered"),
            Err(e) => tracing::warn!(url = %reg.url, "Failed to unregister webhook: {e}"),
        }
    }

    webhooks.stop_server().await?;
    Ok(())
}

/// Builds the remote registration for `public_url`, if one is configured.
///
/// An empty event list subscribes to every known event type.
fn registration(config: &ValidatedConfig) -> Option<WebhookRegistration> {
    let url = config.webhook.public_url.as_ref()?;
    let mut reg = WebhookRegistration::new(url.as_str(), config.subscribed_events());
    if let Some(secret) = &config.webhook.secret {
        reg = reg.with_secret(secret.clone());
    }
    if let Some(description) = &config.webhook.description {
        reg = reg.with_description(description.clone());
    }
    Some(reg)
}

/// Handler that logs each delivery.
fn log_handler() -> WebhookHandler {
    handler(|event: &WebhookEvent| {
        tracing::info!(
            id = %event.id,
            event_type = %event.event_type,
            "{}",
            summarize(event)
        );
        tracing::debug!(data = ?event.data, "Event payload");
        Ok(())
    })
}

/// One-line description of an event for the log.
fn summarize(event: &WebhookEvent) -> String {
    if let Some(msg) = event.data.as_message_received() {
        return match &msg.text {
            Some(text) => format!("{} from {}: {text}", msg.message_type, msg.from),
            None => format!("{} from {}", msg.message_type, msg.from),
        };
    }
    if let Some(status) = event.data.as_message_status() {
        return format!("message {} is now {}", status.message_id, status.status);
    }
    format!("{} event received", event.event_type)
}

async fn stop_quietly(client: &Client) {
    if let Err(e) = client.webhooks().stop_server().await {
        tracing::warn!("Failed to stop webhook receiver: {e}");
    }
}

/// Returns a future that completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
