//! Remote webhook registration records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{BaseResponse, ValidationErrors};

use super::EventType;

/// Request body for registering a webhook with the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookRegistration {
    pub url: String,
    pub events: Vec<EventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl WebhookRegistration {
    #[must_use]
    pub fn new(url: impl Into<String>, events: Vec<EventType>) -> Self {
        Self {
            url: url.into(),
            events,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks the URL is present and every event type is known.
    ///
    /// # Errors
    ///
    /// Returns every failed check.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.url.trim().is_empty(), "url", "webhook URL is required");
        errors.check(
            self.events.is_empty(),
            "events",
            "at least one event type is required",
        );
        for event in self.events.iter().filter(|e| !e.is_known()) {
            errors.add("events", format!("invalid event type: {event}"));
        }
        errors.into_result()
    }
}

/// A webhook as stored by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookConfig {
    pub url: String,
    pub events: Vec<EventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Response of the webhook listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhooksResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub webhooks: Vec<WebhookConfig>,
}
