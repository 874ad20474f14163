//! Configuration layer.
//!
//! This module provides:
//! - Client settings for the library ([`ClientConfig`], [`RateLimitConfig`])
//! - CLI argument parsing for the daemon ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated daemon configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Daemon configuration values are resolved with the following priority
//! (highest to lowest):
//!
//! 1. **Explicit CLI arguments** (including `WATI_TOKEN` / `WATI_WEBHOOK_SECRET`)
//! 2. **TOML config file**
//! 3. **Built-in defaults**
//!
//! `endpoint` and `token` have no defaults. Rate-limit and user-agent
//! overrides are TOML-only. Boolean flags (`--debug`) use OR semantics: a
//! `true` in either source wins.

mod cli;
mod client;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command};
pub use client::{ClientConfig, RateLimitConfig, authorization_header, normalize_endpoint};
pub use error::{ConfigError, field};
pub use toml::{ApiSection, RateLimitSection, TomlConfig, WebhookSection, default_config_template};
pub use validated::{ValidatedConfig, WebhookSettings, write_default_config};
