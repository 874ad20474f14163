//! Webhook event envelope and type dispatch.
//!
//! Decoding is two-pass: the envelope is read with `data` left as a
//! generic JSON value, then `data` is re-read into the payload type chosen
//! by the event's `type` tag. Unknown tags keep the untyped value.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::payload::{
    ChatStatusEventData, ChatbotEventData, ContactEventData, MessageReceivedData,
    MessageSentData, MessageStatusData,
};

/// Kind of webhook event, as carried in the `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    MessageReceived,
    NewContactMessage,
    SessionMessageSent,
    TemplateMessageSent,
    MessageDelivered,
    MessageRead,
    MessageReplied,
    TemplateMessageFailed,
    ContactCreated,
    ContactUpdated,
    ChatbotStarted,
    ChatbotStopped,
    ChatStatusChanged,
    /// A tag this crate does not know; kept verbatim.
    Other(String),
}

impl EventType {
    /// Every known event type.
    pub const ALL: [Self; 13] = [
        Self::MessageReceived,
        Self::NewContactMessage,
        Self::SessionMessageSent,
        Self::TemplateMessageSent,
        Self::MessageDelivered,
        Self::MessageRead,
        Self::MessageReplied,
        Self::TemplateMessageFailed,
        Self::ContactCreated,
        Self::ContactUpdated,
        Self::ChatbotStarted,
        Self::ChatbotStopped,
        Self::ChatStatusChanged,
    ];

    /// Wire tag of this type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::MessageReceived => "message_received",
            Self::NewContactMessage => "new_contact_message",
            Self::SessionMessageSent => "session_message_sent",
            Self::TemplateMessageSent => "template_message_sent",
            Self::MessageDelivered => "message_delivered",
            Self::MessageRead => "message_read",
            Self::MessageReplied => "message_replied",
            Self::TemplateMessageFailed => "template_message_failed",
            Self::ContactCreated => "contact_created",
            Self::ContactUpdated => "contact_updated",
            Self::ChatbotStarted => "chatbot_started",
            Self::ChatbotStopped => "chatbot_stopped",
            Self::ChatStatusChanged => "chat_status_changed",
            Self::Other(tag) => tag,
        }
    }

    /// Parses a wire tag. Never fails; unknown tags become [`EventType::Other`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        Self::ALL
            .iter()
            .find(|known| known.as_str() == tag)
            .cloned()
            .unwrap_or_else(|| Self::Other(tag.to_string()))
    }

    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for EventType {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

/// Event payload, one variant per payload shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventData {
    MessageReceived(MessageReceivedData),
    MessageSent(MessageSentData),
    MessageStatus(MessageStatusData),
    Contact(ContactEventData),
    Chatbot(ChatbotEventData),
    ChatStatus(ChatStatusEventData),
    /// Unknown event type, or no `data` at all (`Value::Null`).
    Untyped(Value),
}

impl EventData {
    /// Re-reads `data` into the payload type selected by `event_type`.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if `data` does not fit the selected type.
    pub fn decode(event_type: &EventType, data: Value) -> Result<Self, serde_json::Error> {
        use EventType as T;

        if data.is_null() {
            return Ok(Self::Untyped(data));
        }

        Ok(match event_type {
            T::MessageReceived | T::NewContactMessage => {
                Self::MessageReceived(serde_json::from_value(data)?)
            }
            T::SessionMessageSent | T::TemplateMessageSent | T::TemplateMessageFailed => {
                Self::MessageSent(serde_json::from_value(data)?)
            }
            T::MessageDelivered | T::MessageRead | T::MessageReplied => {
                Self::MessageStatus(serde_json::from_value(data)?)
            }
            T::ContactCreated | T::ContactUpdated => Self::Contact(serde_json::from_value(data)?),
            T::ChatbotStarted | T::ChatbotStopped => Self::Chatbot(serde_json::from_value(data)?),
            T::ChatStatusChanged => Self::ChatStatus(serde_json::from_value(data)?),
            T::Other(_) => Self::Untyped(data),
        })
    }

    #[must_use]
    pub const fn as_message_received(&self) -> Option<&MessageReceivedData> {
        match self {
            Self::MessageReceived(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_message_sent(&self) -> Option<&MessageSentData> {
        match self {
            Self::MessageSent(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_message_status(&self) -> Option<&MessageStatusData> {
        match self {
            Self::MessageStatus(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_contact(&self) -> Option<&ContactEventData> {
        match self {
            Self::Contact(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_chatbot(&self) -> Option<&ChatbotEventData> {
        match self {
            Self::Chatbot(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_chat_status(&self) -> Option<&ChatStatusEventData> {
        match self {
            Self::ChatStatus(d) => Some(d),
            _ => None,
        }
    }
}

/// Envelope as it appears on the wire, before `data` is typed.
#[derive(Deserialize)]
struct RawEvent {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    event_type: String,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    source: String,
    #[serde(default)]
    version: String,
}

/// A decoded webhook delivery.
///
/// `timestamp` keeps the sender's RFC 3339 text; decoding rejects a
/// non-empty value that does not parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEvent")]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub timestamp: String,
    pub data: EventData,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
}

impl TryFrom<RawEvent> for WebhookEvent {
    type Error = serde_json::Error;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        if !raw.timestamp.is_empty() {
            chrono::DateTime::parse_from_rfc3339(&raw.timestamp).map_err(|e| {
                serde::de::Error::custom(format!("invalid timestamp '{}': {e}", raw.timestamp))
            })?;
        }
        let event_type = EventType::from_tag(&raw.event_type);
        let data = EventData::decode(&event_type, raw.data)?;
        Ok(Self {
            id: raw.id,
            event_type,
            timestamp: raw.timestamp,
            data,
            source: raw.source,
            version: raw.version,
        })
    }
}

impl WebhookEvent {
    /// Decodes a raw delivery body.
    ///
    /// # Errors
    ///
    /// Fails on malformed envelope JSON, or on a `data` value that does not
    /// match the payload type of a known event type.
    pub fn from_slice(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// A `message_received` event used to check that a receiver is reachable.
    #[must_use]
    pub fn test_message(now: chrono::DateTime<chrono::Utc>) -> Self {
        let timestamp = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        Self {
            id: format!("test-{}", now.timestamp()),
            event_type: EventType::MessageReceived,
            timestamp: timestamp.clone(),
            data: EventData::MessageReceived(MessageReceivedData {
                message_id: "test-message-id".to_string(),
                from: "1234567890".to_string(),
                to: "0987654321".to_string(),
                message_type: "text".to_string(),
                text: Some("This is a test message from WATI webhook".to_string()),
                timestamp,
                ..MessageReceivedData::default()
            }),
            source: "wati-webhook-test".to_string(),
            version: "1.0".to_string(),
        }
    }
}
