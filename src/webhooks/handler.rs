//! Handler registry types and typed adapters.

use std::sync::Arc;

use thiserror::Error;

use super::payload::{
    ChatStatusEventData, ChatbotEventData, ContactEventData, MessageReceivedData,
    MessageSentData, MessageStatusData,
};
use super::{EventData, EventType, WebhookEvent};

/// Error type handlers may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A callback invoked for each received event of one type.
pub type WebhookHandler = Arc<dyn Fn(&WebhookEvent) -> Result<(), BoxError> + Send + Sync>;

/// A typed adapter received an event with a different payload shape.
#[derive(Debug, Error)]
#[error("invalid data type for {expected} event: got {event_type}")]
pub struct PayloadMismatch {
    pub expected: &'static str,
    pub event_type: EventType,
}

/// Wraps a closure over the whole event.
pub fn handler<F>(f: F) -> WebhookHandler
where
    F: Fn(&WebhookEvent) -> Result<(), BoxError> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn typed<T, F>(
    expected: &'static str,
    project: fn(&EventData) -> Option<&T>,
    f: F,
) -> WebhookHandler
where
    T: 'static,
    F: Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
{
    Arc::new(move |event: &WebhookEvent| match project(&event.data) {
        Some(data) => f(data),
        None => Err(Box::new(PayloadMismatch {
            expected,
            event_type: event.event_type.clone(),
        })),
    })
}

/// Handler for [`MessageReceivedData`] payloads.
pub fn message_handler<F>(f: F) -> WebhookHandler
where
    F: Fn(&MessageReceivedData) -> Result<(), BoxError> + Send + Sync + 'static,
{
    typed("message", EventData::as_message_received, f)
}

/// Handler for [`MessageSentData`] payloads.
pub fn message_sent_handler<F>(f: F) -> WebhookHandler
where
    F: Fn(&MessageSentData) -> Result<(), BoxError> + Send + Sync + 'static,
{
    typed("message sent", EventData::as_message_sent, f)
}

/// Handler for [`MessageStatusData`] payloads.
pub fn message_status_handler<F>(f: F) -> WebhookHandler
where
    F: Fn(&MessageStatusData) -> Result<(), BoxError> + Send + Sync + 'static,
{
    typed("message status", EventData::as_message_status, f)
}

/// Handler for [`ContactEventData`] payloads.
pub fn contact_handler<F>(f: F) -> WebhookHandler
where
    F: Fn(&ContactEventData) -> Result<(), BoxError> + Send + Sync + 'static,
{
    typed("contact", EventData::as_contact, f)
}

/// Handler for [`ChatbotEventData`] payloads.
pub fn chatbot_handler<F>(f: F) -> WebhookHandler
where
    F: Fn(&ChatbotEventData) -> Result<(), BoxError> + Send + Sync + 'static,
{
    typed("chatbot", EventData::as_chatbot, f)
}

/// Handler for [`ChatStatusEventData`] payloads.
pub fn chat_status_handler<F>(f: F) -> WebhookHandler
where
    F: Fn(&ChatStatusEventData) -> Result<(), BoxError> + Send + Sync + 'static,
{
    typed("chat status", EventData::as_chat_status, f)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn event(event_type: EventType, data: EventData) -> WebhookEvent {
        WebhookEvent {
            id: "evt".to_string(),
            event_type,
            timestamp: String::new(),
            data,
            source: String::new(),
            version: String::new(),
        }
    }

    #[test]
    fn typed_handler_receives_payload() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let h = message_handler(move |d| {
            sink.lock().unwrap().push(d.message_id.clone());
            Ok(())
        });

        let data = MessageReceivedData {
            message_id: "m1".to_string(),
            ..MessageReceivedData::default()
        };
        h(&event(EventType::MessageReceived, EventData::MessageReceived(data))).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["m1".to_string()]);
    }

    #[test]
    fn typed_handler_rejects_other_payloads() {
        let h = contact_handler(|_| Ok(()));
        let err = h(&event(
            EventType::MessageRead,
            EventData::MessageStatus(MessageStatusData::default()),
        ))
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid data type for contact event: got message_read"
        );
    }

    #[test]
    fn handler_errors_propagate() {
        let h = handler(|_| Err("boom".into()));
        let err = h(&event(EventType::ChatbotStarted, EventData::Untyped(serde_json::Value::Null)))
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
