//! CLI argument parsing using clap.
//!
//! Defines the command-line interface of the `wati-webhook` daemon.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// wati-webhook: WATI webhook receiver
///
/// Receives signed webhook events from WATI, logs them, and optionally
/// registers its public URL with the WATI API for the lifetime of the process.
#[derive(Debug, Parser)]
#[command(name = "wati-webhook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// WATI API endpoint (required)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// WATI API bearer token (required)
    #[arg(long, env = "WATI_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Number of retries for transient API failures
    #[arg(long = "retry-count")]
    pub retry_count: Option<u32>,

    /// Port for the webhook receiver (0 picks a free port)
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Shared secret used to verify webhook signatures
    #[arg(long, env = "WATI_WEBHOOK_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Public URL to register with WATI while running
    #[arg(long = "public-url")]
    pub public_url: Option<String>,

    /// Event type to subscribe to when registering (can be specified multiple times)
    #[arg(long = "event", value_name = "TYPE")]
    pub events: Vec<String>,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Log API request and response bodies
    #[arg(long)]
    pub debug: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for wati-webhook
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "wati-webhook.toml")]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
