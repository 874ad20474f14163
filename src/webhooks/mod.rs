//! Webhook events, signature checks and the local receiver.
//!
//! - [`WebhookEvent`]: decoded delivery, typed by [`EventType`]
//! - [`WebhookReceiver`]: handler registry and HTTP server lifecycle
//! - [`WebhookService`]: the receiver plus remote registration

mod error;
mod event;
mod handler;
pub mod payload;
mod receiver;
mod registration;
mod server;
mod service;
pub mod signature;

#[cfg(test)]
mod service_tests;

pub use error::WebhookError;
pub use event::{EventData, EventType, WebhookEvent};
pub use handler::{
    BoxError, PayloadMismatch, WebhookHandler, chat_status_handler, chatbot_handler,
    contact_handler, handler, message_handler, message_sent_handler, message_status_handler,
};
pub use payload::{
    ChatStatusEventData, ChatbotEventData, ContactEventData, MessageReceivedData,
    MessageSentData, MessageStatusData,
};
pub use receiver::WebhookReceiver;
pub use registration::{WebhookConfig, WebhookRegistration, WebhooksResponse};
pub use service::{WebhookService, send_test_event};
pub use signature::{sign_payload, validate_signature};
