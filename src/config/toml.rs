//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Outbound API section
    #[serde(default)]
    pub api: ApiSection,

    /// Webhook receiver section
    #[serde(default)]
    pub webhook: WebhookSection,
}

/// Outbound API configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    /// API base URL
    pub endpoint: Option<String>,

    /// Bearer token
    pub token: Option<String>,

    /// Per-request timeout in seconds
    pub timeout: Option<u64>,

    /// Retries after the first attempt
    pub retry_count: Option<u32>,

    /// User-Agent override
    pub user_agent: Option<String>,

    /// Log request and response bodies
    #[serde(default)]
    pub debug: bool,

    /// Token bucket settings
    #[serde(default)]
    pub rate_limit: RateLimitSection,
}

/// Rate limit subsection of `[api]`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitSection {
    /// Tokens added per second
    pub requests_per_second: Option<u32>,

    /// Bucket capacity
    pub burst_size: Option<u32>,
}

/// Webhook receiver configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookSection {
    /// Listening port
    pub port: Option<u16>,

    /// Signature secret
    pub secret: Option<String>,

    /// URL to register with the API
    pub public_url: Option<String>,

    /// Event types to subscribe to
    #[serde(default)]
    pub events: Vec<String>,

    /// Description sent with the registration
    pub description: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# wati-webhook configuration file

[api]
# WATI API endpoint (required)
# endpoint = "https://live-server-12345.wati.io"

# Bearer token (required, or set WATI_TOKEN)
# token = "your-token-here"

# Per-request timeout in seconds (default: 30)
# timeout = 30

# Retries for 5xx/429 responses and network failures (default: 3)
# retry_count = 3

# Log request and response bodies
# debug = false

[api.rate_limit]
# Tokens added per second (default: 10)
# requests_per_second = 10

# Bucket capacity (default: 20)
# burst_size = 20

[webhook]
# Receiver port (default: 8080)
port = 8080

# Shared secret for X-Webhook-Signature verification.
# Without a secret every delivery is accepted.
# secret = "change-me"

# Public URL registered with WATI while running (optional)
# public_url = "https://hooks.example.com/webhook"

# Events to subscribe to when registering (default: all)
# events = ["message_received", "message_delivered", "message_read"]

# description = "wati-webhook receiver"
"#
    .to_string()
}
