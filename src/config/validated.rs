//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration used by the
//! `wati-webhook` daemon. All validation is performed during construction.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::webhooks::EventType;

use super::cli::Cli;
use super::client::ClientConfig;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Receiver-side settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSettings {
    /// Port to listen on (0 = ephemeral)
    pub port: u16,

    /// Shared signature secret, if any
    pub secret: Option<String>,

    /// URL to register remotely while running
    pub public_url: Option<Url>,

    /// Events to subscribe to; every known type when left empty
    pub events: Vec<EventType>,

    /// Registration description
    pub description: Option<String>,
}

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    /// Outbound client settings (validated)
    pub client: ClientConfig,

    /// Receiver settings
    pub webhook: WebhookSettings,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let public_url = self
            .webhook
            .public_url
            .as_ref()
            .map_or_else(|| "none".to_string(), ToString::to_string);

        write!(
            f,
            "Config {{ endpoint: {}, timeout: {}s, retries: {}, rate_limit: {}/s burst {}, \
             port: {}, signed: {}, public_url: {}, events: {} }}",
            self.client.endpoint,
            self.client.timeout.as_secs(),
            self.client.retry_count,
            self.client.rate_limit.requests_per_second,
            self.client.rate_limit.burst_size,
            self.webhook.port,
            self.webhook.secret.is_some(),
            public_url,
            self.webhook.events.len(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values, which take
    /// precedence over built-in defaults. `--event` flags replace the TOML
    /// event list entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required fields are missing (`endpoint`, `token`)
    /// - The endpoint or public URL is invalid
    /// - The timeout or rate-limit values are zero
    /// - An event type is unknown
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let client = Self::build_client(cli, toml)?;
        let webhook = Self::build_webhook(cli, toml)?;

        Ok(Self {
            client,
            webhook,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or
    /// the merged configuration is invalid.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn build_client(cli: &Cli, toml: Option<&TomlConfig>) -> Result<ClientConfig, ConfigError> {
        let api = toml.map(|t| &t.api);

        let endpoint = cli
            .endpoint
            .clone()
            .or_else(|| api.and_then(|a| a.endpoint.clone()))
            .ok_or_else(|| {
                ConfigError::missing(
                    field::ENDPOINT,
                    "Use --endpoint or set api.endpoint in config file",
                )
            })?;
        let token = cli
            .token
            .clone()
            .or_else(|| api.and_then(|a| a.token.clone()))
            .ok_or_else(|| {
                ConfigError::missing(
                    field::TOKEN,
                    "Use --token, WATI_TOKEN or set api.token in config file",
                )
            })?;

        let timeout_secs = cli
            .timeout
            .or_else(|| api.and_then(|a| a.timeout))
            .unwrap_or(defaults::TIMEOUT_SECS);
        let retry_count = cli
            .retry_count
            .or_else(|| api.and_then(|a| a.retry_count))
            .unwrap_or(defaults::RETRY_COUNT);
        let rps = api
            .and_then(|a| a.rate_limit.requests_per_second)
            .unwrap_or(defaults::RATE_LIMIT_REQUESTS_PER_SECOND);
        let burst = api
            .and_then(|a| a.rate_limit.burst_size)
            .unwrap_or(defaults::RATE_LIMIT_BURST_SIZE);
        let debug = cli.debug || api.is_some_and(|a| a.debug);

        let mut client = ClientConfig::new(endpoint, token)
            .with_timeout(Duration::from_secs(timeout_secs))
            .with_retry_count(retry_count)
            .with_rate_limit(rps, burst)
            .with_debug(debug);
        if let Some(user_agent) = api.and_then(|a| a.user_agent.clone()) {
            client = client.with_user_agent(user_agent);
        }

        client.validate()?;
        Ok(client)
    }

    fn build_webhook(cli: &Cli, toml: Option<&TomlConfig>) -> Result<WebhookSettings, ConfigError> {
        let section = toml.map(|t| &t.webhook);

        let port = cli
            .port
            .or_else(|| section.and_then(|s| s.port))
            .unwrap_or(defaults::WEBHOOK_PORT);
        let secret = cli
            .secret
            .clone()
            .or_else(|| section.and_then(|s| s.secret.clone()))
            .filter(|s| !s.is_empty());

        let public_url = cli
            .public_url
            .clone()
            .or_else(|| section.and_then(|s| s.public_url.clone()))
            .map(|raw| {
                Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
                    url: raw,
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let raw_events: &[String] = if cli.events.is_empty() {
            section.map_or(&[][..], |s| s.events.as_slice())
        } else {
            &cli.events
        };
        let events = parse_events(raw_events)?;

        Ok(WebhookSettings {
            port,
            secret,
            public_url,
            events,
            description: section.and_then(|s| s.description.clone()),
        })
    }

    /// Events to register: the configured list, or every known type.
    #[must_use]
    pub fn subscribed_events(&self) -> Vec<EventType> {
        if self.webhook.events.is_empty() {
            EventType::ALL.to_vec()
        } else {
            self.webhook.events.clone()
        }
    }
}

fn parse_events(raw: &[String]) -> Result<Vec<EventType>, ConfigError> {
    raw.iter()
        .map(|value| {
            let event = EventType::from_tag(value.trim());
            if event.is_known() {
                Ok(event)
            } else {
                Err(ConfigError::InvalidEvent {
                    value: value.clone(),
                })
            }
        })
        .collect()
}

/// Writes the default configuration template to `path`.
///
/// # Errors
///
/// Returns [`ConfigError::FileWrite`] if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, super::toml::default_config_template()).map_err(|e| {
        ConfigError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        }
    })
}
