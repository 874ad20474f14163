//! HTTP surface of the webhook receiver.
//!
//! - `POST /webhook`: verify, decode and dispatch one delivery
//! - `GET /health`: unauthenticated liveness report
//!
//! Other methods on `/webhook` get 405 from the method router.

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::WebhookReceiver;
use super::signature::{FALLBACK_SIGNATURE_HEADER, SIGNATURE_HEADER};

/// Body of every 400 answer; the cause is only logged.
const REJECTED_BODY: &str = "Error processing webhook";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Ack {
    status: &'static str,
    event_id: String,
    event_type: String,
    timestamp: String,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    timestamp: String,
    server: ServerStatus,
}

#[derive(Serialize)]
struct ServerStatus {
    port: u16,
    running: bool,
    handlers: usize,
}

#[allow(deprecated)]
pub(super) fn router(receiver: WebhookReceiver) -> Router {
    let timeout = receiver.request_timeout();
    Router::new()
        .route("/webhook", post(receive))
        .route("/health", get(health))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(receiver)
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Primary header first; an empty primary falls through to the fallback.
fn signature(headers: &HeaderMap) -> &str {
    [SIGNATURE_HEADER, FALLBACK_SIGNATURE_HEADER]
        .into_iter()
        .filter_map(|name| headers.get(name)?.to_str().ok())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

async fn receive(
    State(receiver): State<WebhookReceiver>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match receiver.handle_webhook(&body, signature(&headers)) {
        Ok(event) => {
            tracing::debug!("Received {} event {}", event.event_type, event.id);
            Json(Ack {
                status: "success",
                event_id: event.id,
                event_type: event.event_type.into(),
                timestamp: now_rfc3339(),
            })
            .into_response()
        }
        Err(e) => {
            tracing::warn!("Error handling webhook: {e}");
            (StatusCode::BAD_REQUEST, REJECTED_BODY).into_response()
        }
    }
}

async fn health(State(receiver): State<WebhookReceiver>) -> Json<Health> {
    Json(Health {
        status: "healthy",
        timestamp: now_rfc3339(),
        server: ServerStatus {
            port: receiver.port(),
            running: receiver.is_running(),
            handlers: receiver.handler_count(),
        },
    })
}
