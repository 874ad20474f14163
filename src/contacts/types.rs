//! Contact records and request bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{BaseResponse, CustomParam, MIN_PHONE_LENGTH, Pagination, ValidationErrors};
use crate::config::defaults;

/// A contact as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    #[serde(rename = "wAid")]
    pub wa_id: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub full_name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub contact_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub created: String,
    pub tags: Vec<String>,
    pub custom_params: Vec<CustomParam>,
    pub opted_in: bool,
    pub is_deleted: bool,
    pub last_updated: String,
    pub allow_broadcast: bool,
    #[serde(rename = "allowSMS")]
    pub allow_sms: bool,
    pub team_ids: Vec<String>,
    pub is_in_flow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_flow_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_flow_node_id: Option<String>,
}

/// Query parameters for listing contacts.
///
/// Page and page size fall back to 1 and 20 when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetContactsParams {
    pub page_size: Option<u32>,
    pub page_number: Option<u32>,
    pub name: Option<String>,
    pub attribute: Option<String>,
    /// `YYYY-MM-DD`
    pub created_date: Option<String>,
}

impl GetContactsParams {
    #[must_use]
    pub fn page(page_number: u32, page_size: u32) -> Self {
        Self {
            page_size: Some(page_size),
            page_number: Some(page_number),
            ..Self::default()
        }
    }

    /// `(key, value)` pairs with defaults applied.
    pub(crate) fn query(&self) -> [(&'static str, Option<String>); 5] {
        let size = self.page_size.filter(|&s| s > 0).unwrap_or(defaults::PAGE_SIZE);
        let number = self.page_number.filter(|&n| n > 0).unwrap_or(1);
        [
            ("pageSize", Some(size.to_string())),
            ("pageNumber", Some(number.to_string())),
            ("name", non_empty(self.name.as_deref())),
            ("attribute", non_empty(self.attribute.as_deref())),
            ("createdDate", non_empty(self.created_date.as_deref())),
        ]
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// A page of contacts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactsResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(flatten)]
    pub pagination: Pagination,
    pub contacts: Vec<Contact>,
}

/// Envelope around a single contact.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ContactResponse {
    pub contact: Contact,
}

/// Body for creating a contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateContactRequest {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_params: Vec<CustomParam>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub allow_broadcast: bool,
    #[serde(rename = "allowSMS")]
    pub allow_sms: bool,
}

impl CreateContactRequest {
    #[must_use]
    pub fn new(first_name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            phone: phone.into(),
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns every missing or malformed field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.first_name.is_empty(), "firstName", "firstName is required");
        if self.phone.is_empty() {
            errors.add("phone", "phone is required");
        } else if self.phone.len() < MIN_PHONE_LENGTH {
            errors.add("phone", "phone number must be at least 10 digits");
        }
        errors.into_result()
    }
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateContactRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_params: Vec<CustomParam>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_broadcast: Option<bool>,
    #[serde(rename = "allowSMS", skip_serializing_if = "Option::is_none")]
    pub allow_sms: Option<bool>,
}

/// Client-side filter for [`super::ContactsService::filter_contacts`].
///
/// Only `name` and `created_after` are forwarded; the API has no
/// parameters for the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilter {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tags: Vec<String>,
    pub contact_status: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub opted_in: Option<bool>,
    pub allow_broadcast: Option<bool>,
}

/// Per-item failure in a bulk insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkContactError {
    pub index: usize,
    pub error: String,
    pub contact: CreateContactRequest,
}

/// Result of [`super::ContactsService::add_contacts`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BulkContactResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub success_count: u32,
    pub failure_count: u32,
    pub contacts: Vec<Contact>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<BulkContactError>,
}
