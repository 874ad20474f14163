//! Envelope and value types shared by several resource areas.

use serde::{Deserialize, Serialize};

/// Fields every API response carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseResponse {
    pub result: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Paging metadata on list responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_count: u32,
}

impl Pagination {
    /// True once `page` reaches the last page.
    #[must_use]
    pub const fn is_last_page(&self) -> bool {
        self.page >= self.total_pages
    }
}

/// A named attribute value on a contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomParam {
    pub name: String,
    pub value: String,
}

impl CustomParam {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A template placeholder value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Result of rotating the API token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenResponse {
    pub result: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub token: String,
    pub expires_at: Option<String>,
}

/// Builds `path?k=v&...` with URL-encoded values, skipping absent ones.
pub(crate) fn with_query<'a>(
    path: &str,
    params: impl IntoIterator<Item = (&'a str, Option<String>)>,
) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params {
        if let Some(value) = value {
            serializer.append_pair(key, &value);
            any = true;
        }
    }
    if any {
        format!("{path}?{}", serializer.finish())
    } else {
        path.to_string()
    }
}

/// Percent-encodes one path segment.
pub(crate) fn path_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Validation rule for phone numbers sent to the API.
pub(crate) const MIN_PHONE_LENGTH: usize = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_skips_missing_values_and_encodes() {
        let path = with_query(
            "/api/v1/getContacts",
            [
                ("pageSize", Some("20".to_string())),
                ("name", None),
                ("attribute", Some("city=Paris & co".to_string())),
            ],
        );
        assert_eq!(
            path,
            "/api/v1/getContacts?pageSize=20&attribute=city%3DParis+%26+co"
        );
    }

    #[test]
    fn query_without_values_leaves_path_alone() {
        assert_eq!(with_query("/x", [("a", None)]), "/x");
    }

    #[test]
    fn path_segment_encodes_spaces_and_slashes() {
        assert_eq!(path_segment("my file/1.png"), "my%20file%2F1.png");
    }

    #[test]
    fn base_response_tolerates_missing_fields() {
        let resp: BaseResponse = serde_json::from_str(r#"{"result":true}"#).unwrap();
        assert!(resp.result);
        assert!(resp.message.is_none());
    }

    #[test]
    fn pagination_last_page() {
        let p = Pagination {
            page: 3,
            page_size: 50,
            total_pages: 3,
            total_count: 120,
        };
        assert!(p.is_last_page());
    }
}
