//! Typed payloads carried in the `data` field of webhook events.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::CustomParam;

/// An inbound message (`message_received`, `new_contact_message`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessageReceivedData {
    pub message_id: String,
    pub from: String,
    pub to: String,
    pub message_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive: Option<InteractiveInfo>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_profile: Option<ContactProfile>,
}

impl MessageReceivedData {
    /// Text of a text message, or the chosen title of a button/list reply.
    #[must_use]
    pub fn message_text(&self) -> &str {
        match self.message_type.as_str() {
            "text" => self.text.as_deref().unwrap_or_default(),
            "interactive" => self
                .interactive
                .as_ref()
                .and_then(|i| {
                    i.button_reply
                        .as_ref()
                        .map(|b| b.title.as_str())
                        .or_else(|| i.list_reply.as_ref().map(|l| l.title.as_str()))
                })
                .unwrap_or_default(),
            _ => "",
        }
    }

    #[must_use]
    pub fn is_text_message(&self) -> bool {
        self.message_type == "text"
    }

    #[must_use]
    pub const fn is_media_message(&self) -> bool {
        self.media.is_some()
    }

    #[must_use]
    pub const fn is_location_message(&self) -> bool {
        self.location.is_some()
    }

    #[must_use]
    pub const fn is_contact_message(&self) -> bool {
        self.contact.is_some()
    }

    #[must_use]
    pub const fn is_interactive_message(&self) -> bool {
        self.interactive.is_some()
    }

    #[must_use]
    pub fn is_button_reply(&self) -> bool {
        self.interactive
            .as_ref()
            .is_some_and(|i| i.button_reply.is_some())
    }

    #[must_use]
    pub fn is_list_reply(&self) -> bool {
        self.interactive
            .as_ref()
            .is_some_and(|i| i.list_reply.is_some())
    }

    /// Sender's profile name, empty when the profile is absent.
    #[must_use]
    pub fn contact_name(&self) -> &str {
        self.contact_profile
            .as_ref()
            .map_or("", |p| p.name.as_str())
    }
}

/// An outbound message report (`session_message_sent`,
/// `template_message_sent`, `template_message_failed`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessageSentData {
    pub message_id: String,
    pub from: String,
    pub to: String,
    pub message_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    pub status: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_profile: Option<ContactProfile>,
}

impl MessageSentData {
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        self.status == "delivered"
    }

    #[must_use]
    pub fn is_read(&self) -> bool {
        self.status == "read"
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == "failed"
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        non_empty(self.error_code.as_deref()).is_some()
            || non_empty(self.error_message.as_deref()).is_some()
    }

    /// Error message, else `"Error code: <code>"`, else `None`.
    #[must_use]
    pub fn error_info(&self) -> Option<String> {
        if let Some(message) = non_empty(self.error_message.as_deref()) {
            return Some(message.to_string());
        }
        non_empty(self.error_code.as_deref()).map(|code| format!("Error code: {code}"))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// A delivery receipt (`message_delivered`, `message_read`, `message_replied`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessageStatusData {
    pub message_id: String,
    pub from: String,
    pub to: String,
    pub status: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// `contact_created` / `contact_updated`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactEventData {
    pub contact_id: String,
    pub whatsapp_number: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_params: Vec<CustomParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub timestamp: String,
    /// Changed fields, for updates
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub changes: Map<String, Value>,
}

/// `chatbot_started` / `chatbot_stopped`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatbotEventData {
    pub chatbot_id: String,
    pub chatbot_name: String,
    pub whatsapp_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub status: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `chat_status_changed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatStatusEventData {
    pub whatsapp_number: String,
    pub old_status: String,
    pub new_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_by: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaInfo {
    pub id: String,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationInfo {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A shared contact card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<Email>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<ContactUrl>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneNumber {
    pub phone: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Email {
    pub email: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactUrl {
    pub url: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Reply to an interactive message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractiveInfo {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_reply: Option<ButtonReply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_reply: Option<ListReply>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactProfile {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonReply {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListReply {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
