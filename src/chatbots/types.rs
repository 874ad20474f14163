//! Chatbot, rule and chat-session types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::{BaseResponse, MIN_PHONE_LENGTH, ValidationErrors};

/// A configured chatbot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chatbot {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
    pub created: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<Response>,
}

impl Chatbot {
    /// Status compares case-insensitively; the API has sent both spellings.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }

    pub fn active_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.is_active)
    }

    pub fn active_responses(&self) -> impl Iterator<Item = &Response> {
        self.responses.iter().filter(|r| r.is_active)
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }

    /// Adds `keyword` unless already present.
    pub fn add_keyword(&mut self, keyword: impl Into<String>) {
        let keyword = keyword.into();
        if !self.has_keyword(&keyword) {
            self.keywords.push(keyword);
        }
    }

    /// Removes the first occurrence of `keyword`.
    pub fn remove_keyword(&mut self, keyword: &str) {
        if let Some(i) = self.keywords.iter().position(|k| k == keyword) {
            self.keywords.remove(i);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub trigger: Trigger,
    pub actions: Vec<Action>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    pub is_active: bool,
    pub priority: i32,
}

/// What fires a rule: `KEYWORD`, `PATTERN`, `EVENT`, `SCHEDULE` or
/// `INACTIVITY`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trigger {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,
    /// Seconds.
    #[serde(skip_serializing_if = "is_zero")]
    pub delay: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign_to: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags_to_add: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags_to_remove: Vec<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(n: &u32) -> bool {
    *n == 0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: String,
    pub field: String,
    pub operator: String,
    pub value: Value,
}

/// A canned reply sent when `trigger` matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Response {
    pub id: String,
    pub trigger: String,
    pub message: String,
    pub is_active: bool,
}

impl Response {
    #[must_use]
    pub fn new(trigger: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            message: message.into(),
            is_active: true,
            ..Self::default()
        }
    }
}

/// State of a conversation in the team inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChatStatus {
    Open,
    Assigned,
    Resolved,
    Closed,
    Bot,
}

impl ChatStatus {
    pub const ALL: [Self; 5] = [
        Self::Open,
        Self::Assigned,
        Self::Resolved,
        Self::Closed,
        Self::Bot,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Assigned => "ASSIGNED",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
            Self::Bot => "BOT",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl fmt::Display for ChatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records `whatsappNumber` failures.
fn check_phone(errors: &mut ValidationErrors, number: &str) {
    if number.is_empty() {
        errors.add("whatsappNumber", "whatsappNumber is required");
    } else if number.len() < MIN_PHONE_LENGTH {
        errors.add("whatsappNumber", "whatsappNumber must be at least 10 digits");
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StartChatbotRequest {
    pub chatbot_id: String,
    pub whatsapp_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_message: Option<String>,
}

impl StartChatbotRequest {
    #[must_use]
    pub fn new(chatbot_id: impl Into<String>, whatsapp_number: impl Into<String>) -> Self {
        Self {
            chatbot_id: chatbot_id.into(),
            whatsapp_number: whatsapp_number.into(),
            initial_message: None,
        }
    }

    /// # Errors
    ///
    /// Returns every missing or malformed field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.chatbot_id.is_empty(), "chatbotId", "chatbotId is required");
        check_phone(&mut errors, &self.whatsapp_number);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatbotResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub chatbot: Chatbot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub status: String,
}

/// Moves a conversation to another [`ChatStatus`].
///
/// `status` stays a string so values outside [`ChatStatus`] are reported
/// by [`UpdateChatStatusRequest::validate`] rather than lost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateChatStatusRequest {
    pub whatsapp_number: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl UpdateChatStatusRequest {
    #[must_use]
    pub fn new(whatsapp_number: impl Into<String>, status: ChatStatus) -> Self {
        Self {
            whatsapp_number: whatsapp_number.into(),
            status: status.as_str().to_string(),
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns every missing or malformed field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_phone(&mut errors, &self.whatsapp_number);
        if self.status.is_empty() {
            errors.add("status", "status is required");
        } else if ChatStatus::parse(&self.status).is_none() {
            let valid: Vec<_> = ChatStatus::ALL.iter().map(|s| s.as_str()).collect();
            errors.add(
                "status",
                format!(
                    "invalid status: {}. Valid statuses are: [{}]",
                    self.status,
                    valid.join(" ")
                ),
            );
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatStatusResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub whatsapp_number: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatbotsResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub chatbots: Vec<Chatbot>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateChatbotRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<Response>,
    pub is_active: bool,
}

impl CreateChatbotRequest {
    /// # Errors
    ///
    /// Returns every missing field, including those of each response.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.name.is_empty(), "name", "name is required");
        errors.check(
            self.keywords.is_empty() && self.responses.is_empty(),
            "keywords",
            "at least one keyword or response is required",
        );
        for (i, response) in self.responses.iter().enumerate() {
            errors.check(
                response.trigger.is_empty(),
                format!("responses[{i}].trigger"),
                format!("trigger is required for response {i}"),
            );
            errors.check(
                response.message.is_empty(),
                format!("responses[{i}].message"),
                format!("message is required for response {i}"),
            );
        }
        errors.into_result()
    }
}

/// Partial update; unset fields are left untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateChatbotRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<Response>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ChatbotEnvelope {
    pub chatbot: Chatbot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_edits() {
        let mut bot = Chatbot::default();
        bot.add_keyword("hi");
        bot.add_keyword("hi");
        bot.add_keyword("menu");
        assert_eq!(bot.keywords, ["hi", "menu"]);

        bot.remove_keyword("hi");
        bot.remove_keyword("absent");
        assert_eq!(bot.keywords, ["menu"]);
        assert!(!bot.has_keyword("hi"));
    }

    #[test]
    fn active_filters() {
        let bot = Chatbot {
            status: "ACTIVE".to_string(),
            rules: vec![
                Rule {
                    id: "r1".to_string(),
                    is_active: true,
                    ..Rule::default()
                },
                Rule::default(),
            ],
            responses: vec![Response::new("hi", "hello"), Response::default()],
            ..Chatbot::default()
        };

        assert!(bot.is_active());
        assert_eq!(bot.active_rules().count(), 1);
        assert_eq!(bot.active_responses().count(), 1);
    }

    #[test]
    fn chat_status_wire_names() {
        assert_eq!(serde_json::to_value(ChatStatus::Resolved).unwrap(), "RESOLVED");
        assert_eq!(ChatStatus::parse("BOT"), Some(ChatStatus::Bot));
        assert_eq!(ChatStatus::parse("open"), None);
    }

    #[test]
    fn chat_status_request_lists_valid_values() {
        let mut req = UpdateChatStatusRequest::new("5511999999999", ChatStatus::Open);
        req.status = "PENDING".to_string();

        let errors = req.validate().unwrap_err();
        assert_eq!(
            errors.errors()[0].message,
            "invalid status: PENDING. Valid statuses are: [OPEN ASSIGNED RESOLVED CLOSED BOT]"
        );
    }

    #[test]
    fn rule_decodes_nested_actions() {
        let rule: Rule = serde_json::from_value(serde_json::json!({
            "id": "r",
            "trigger": {"type": "KEYWORD", "keywords": ["price"]},
            "actions": [{"type": "SEND_MESSAGE", "message": "See menu", "delay": 2, "tagsToAdd": ["lead"]}],
            "conditions": [{"type": "contact", "field": "city", "operator": "eq", "value": "Lima"}],
            "isActive": true,
            "priority": 1
        }))
        .unwrap();

        assert_eq!(rule.trigger.kind, "KEYWORD");
        assert_eq!(rule.actions[0].delay, 2);
        assert_eq!(rule.actions[0].tags_to_add, ["lead"]);
        assert_eq!(rule.conditions[0].value, "Lima");
    }
}
