//! Message, template and interactive-message types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{BaseResponse, MIN_PHONE_LENGTH, Pagination, Parameter, ValidationErrors};
use crate::config::defaults;
use crate::contacts::Contact;
use crate::webhooks::payload::MediaInfo;

/// Records `whatsappNumber` failures under `field`.
fn check_phone(errors: &mut ValidationErrors, field: &str, number: &str, suffix: &str) {
    if number.is_empty() {
        errors.add(field, format!("whatsappNumber is required{suffix}"));
    } else if number.len() < MIN_PHONE_LENGTH {
        errors.add(field, format!("whatsappNumber must be at least 10 digits{suffix}"));
    }
}

/// A message from the conversation history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub from: String,
    pub to: String,
    pub timestamp: String,
    pub status: String,
    pub direction: String,
    pub message_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateInfo>,
    /// Interactive content as sent; its shape depends on the message kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive: Option<Value>,
}

/// Template reference on a sent message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateInfo {
    pub name: String,
    pub language: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

/// Sends one approved template to one number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendTemplateMessageRequest {
    #[serde(rename = "whatsappNumber")]
    pub whatsapp_number: String,
    pub template_name: String,
    pub broadcast_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl SendTemplateMessageRequest {
    #[must_use]
    pub fn new(
        whatsapp_number: impl Into<String>,
        template_name: impl Into<String>,
        broadcast_name: impl Into<String>,
    ) -> Self {
        Self {
            whatsapp_number: whatsapp_number.into(),
            template_name: template_name.into(),
            broadcast_name: broadcast_name.into(),
            parameters: Vec::new(),
        }
    }

    /// # Errors
    ///
    /// Returns every missing or malformed field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_phone(&mut errors, "whatsappNumber", &self.whatsapp_number, "");
        errors.check(
            self.template_name.is_empty(),
            "template_name",
            "template_name is required",
        );
        errors.check(
            self.broadcast_name.is_empty(),
            "broadcast_name",
            "broadcast_name is required",
        );
        errors.into_result()
    }
}

/// One recipient of a bulk template send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateMessageRecipient {
    #[serde(rename = "whatsappNumber")]
    pub whatsapp_number: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl TemplateMessageRecipient {
    #[must_use]
    pub fn new(whatsapp_number: impl Into<String>) -> Self {
        Self {
            whatsapp_number: whatsapp_number.into(),
            parameters: Vec::new(),
        }
    }
}

/// Sends one template to up to 100 numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendTemplateMessagesRequest {
    pub template_name: String,
    pub broadcast_name: String,
    pub recipients: Vec<TemplateMessageRecipient>,
}

impl SendTemplateMessagesRequest {
    /// # Errors
    ///
    /// Returns every missing or malformed field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(
            self.template_name.is_empty(),
            "template_name",
            "template_name is required",
        );
        errors.check(
            self.broadcast_name.is_empty(),
            "broadcast_name",
            "broadcast_name is required",
        );
        errors.check(
            self.recipients.is_empty(),
            "recipients",
            "at least one recipient is required",
        );
        errors.check(
            self.recipients.len() > defaults::MAX_BULK_ITEMS,
            "recipients",
            format!(
                "maximum {} recipients allowed per request, got {}",
                defaults::MAX_BULK_ITEMS,
                self.recipients.len()
            ),
        );
        for (i, recipient) in self.recipients.iter().enumerate() {
            check_phone(
                &mut errors,
                &format!("recipients[{i}].whatsappNumber"),
                &recipient.whatsapp_number,
                &format!(" for recipient {i}"),
            );
        }
        errors.into_result()
    }
}

/// `{"ids": [...]}` block on send responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Model {
    pub ids: Vec<String>,
}

/// Result of a send call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub phone_number: String,
    pub template_name: String,
    /// The API spells this key `parameteres`.
    #[serde(rename = "parameteres")]
    pub parameters: Vec<Parameter>,
    pub contact: Option<Contact>,
    pub model: Model,
    #[serde(rename = "validWhatsAppNumber")]
    pub valid_whatsapp_number: bool,
}

/// Per-recipient failure in a bulk send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkMessageError {
    pub index: usize,
    pub error: String,
    pub recipient: TemplateMessageRecipient,
}

/// Result of a bulk template send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BulkMessageResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub success_count: u32,
    pub failure_count: u32,
    pub messages: Vec<MessageResponse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<BulkMessageError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveHeader {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveText {
    pub text: String,
}

impl InteractiveText {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveListRow {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveSection {
    pub title: String,
    pub rows: Vec<InteractiveListRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveListAction {
    pub button: String,
    pub sections: Vec<InteractiveSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveButtonReply {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveButton {
    #[serde(rename = "type")]
    pub kind: String,
    pub reply: InteractiveButtonReply,
}

impl InteractiveButton {
    /// A quick-reply button.
    #[must_use]
    pub fn reply(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind: "reply".to_string(),
            reply: InteractiveButtonReply {
                id: id.into(),
                title: title.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveButtonAction {
    pub buttons: Vec<InteractiveButton>,
}

/// A list menu opened by one button.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveListMessageRequest {
    #[serde(rename = "whatsappNumber")]
    pub whatsapp_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<InteractiveHeader>,
    pub body: InteractiveText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<InteractiveText>,
    pub action: InteractiveListAction,
}

impl InteractiveListMessageRequest {
    #[must_use]
    pub fn new(
        whatsapp_number: impl Into<String>,
        body: impl Into<String>,
        button: impl Into<String>,
        sections: Vec<InteractiveSection>,
    ) -> Self {
        Self {
            whatsapp_number: whatsapp_number.into(),
            header: None,
            body: InteractiveText::new(body),
            footer: None,
            action: InteractiveListAction {
                button: button.into(),
                sections,
            },
        }
    }

    /// # Errors
    ///
    /// Returns every missing field, down to individual rows.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_phone(&mut errors, "whatsappNumber", &self.whatsapp_number, "");
        errors.check(self.body.text.is_empty(), "body.text", "body text is required");
        errors.check(
            self.action.button.is_empty(),
            "action.button",
            "action button text is required",
        );
        errors.check(
            self.action.sections.is_empty(),
            "action.sections",
            "at least one section is required",
        );
        for (i, section) in self.action.sections.iter().enumerate() {
            let field = format!("action.sections[{i}]");
            errors.check(
                section.title.is_empty(),
                format!("{field}.title"),
                format!("section title is required for section {i}"),
            );
            errors.check(
                section.rows.is_empty(),
                format!("{field}.rows"),
                format!("at least one row is required for section {i}"),
            );
            for (j, row) in section.rows.iter().enumerate() {
                errors.check(
                    row.id.is_empty(),
                    format!("{field}.rows[{j}].id"),
                    format!("row ID is required for section {i}, row {j}"),
                );
                errors.check(
                    row.title.is_empty(),
                    format!("{field}.rows[{j}].title"),
                    format!("row title is required for section {i}, row {j}"),
                );
            }
        }
        errors.into_result()
    }
}

/// Up to three reply buttons under a body text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveButtonMessageRequest {
    #[serde(rename = "whatsappNumber")]
    pub whatsapp_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<InteractiveHeader>,
    pub body: InteractiveText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<InteractiveText>,
    pub action: InteractiveButtonAction,
}

/// Most buttons one message may carry.
pub const MAX_BUTTONS: usize = 3;

impl InteractiveButtonMessageRequest {
    #[must_use]
    pub fn new(
        whatsapp_number: impl Into<String>,
        body: impl Into<String>,
        buttons: Vec<InteractiveButton>,
    ) -> Self {
        Self {
            whatsapp_number: whatsapp_number.into(),
            header: None,
            body: InteractiveText::new(body),
            footer: None,
            action: InteractiveButtonAction { buttons },
        }
    }

    /// # Errors
    ///
    /// Returns every missing field and a count outside `1..=3`.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let buttons = &self.action.buttons;
        check_phone(&mut errors, "whatsappNumber", &self.whatsapp_number, "");
        errors.check(self.body.text.is_empty(), "body.text", "body text is required");
        errors.check(
            buttons.is_empty(),
            "action.buttons",
            "at least one button is required",
        );
        errors.check(
            buttons.len() > MAX_BUTTONS,
            "action.buttons",
            format!("maximum {MAX_BUTTONS} buttons allowed, got {}", buttons.len()),
        );
        for (i, button) in buttons.iter().enumerate() {
            errors.check(
                button.reply.id.is_empty(),
                format!("action.buttons[{i}].reply.id"),
                format!("button ID is required for button {i}"),
            );
            errors.check(
                button.reply.title.is_empty(),
                format!("action.buttons[{i}].reply.title"),
                format!("button title is required for button {i}"),
            );
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateParameter {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateButton {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateComponent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<TemplateParameter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<TemplateButton>,
}

/// A message template registered with the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub language: String,
    pub status: String,
    pub category: String,
    pub components: Vec<TemplateComponent>,
    pub created_at: String,
    pub updated_at: String,
}

impl Template {
    /// Approved or active templates can be sent.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.status.as_str(), "APPROVED" | "ACTIVE")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub templates: Vec<Template>,
}

/// Query parameters for the message history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetMessagesParams {
    pub page_size: Option<u32>,
    pub page_number: Option<u32>,
    pub phone: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl GetMessagesParams {
    pub(crate) fn query(&self) -> [(&'static str, Option<String>); 5] {
        let size = self.page_size.filter(|&s| s > 0).unwrap_or(defaults::PAGE_SIZE);
        let number = self.page_number.filter(|&n| n > 0).unwrap_or(1);
        let text = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        [
            ("pageSize", Some(size.to_string())),
            ("pageNumber", Some(number.to_string())),
            ("phone", text(&self.phone)),
            ("fromDate", text(&self.from_date)),
            ("toDate", text(&self.to_date)),
        ]
    }
}

/// A page of message history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(flatten)]
    pub pagination: Pagination,
    pub messages: Vec<Message>,
}

/// Delivery state of one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageStatus {
    pub id: String,
    pub status: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MessageEnvelope {
    pub message: Message,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StatusEnvelope {
    pub status: MessageStatus,
}
