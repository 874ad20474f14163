//! Application startup and utilities.
//!
//! Exit codes, tracing setup and configuration hints for the entry point.

use tracing::Level;
use tracing_subscriber::EnvFilter;
use wati::config::{ConfigError, field};

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1): bad arguments, missing endpoint or token.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Runtime error (exit code 2): bind failure, rejected registration.
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Whether `error` is one that a generated config file would fix.
pub fn suggests_init(error: &ConfigError) -> bool {
    match error {
        ConfigError::MissingRequired { field: f, .. } => {
            *f == field::ENDPOINT || *f == field::TOKEN
        }
        ConfigError::FileRead { .. } => true,
        _ => false,
    }
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    if suggests_init(error) {
        eprintln!("\nRun 'wati-webhook init' to generate a configuration template.");
    }
}

/// Sets up the tracing subscriber for logging.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_credentials_suggest_init() {
        assert!(suggests_init(&ConfigError::missing(field::ENDPOINT, "")));
        assert!(suggests_init(&ConfigError::missing(field::TOKEN, "")));
    }

    #[test]
    fn unreadable_file_suggests_init() {
        let error = ConfigError::FileRead {
            path: PathBuf::from("missing.toml"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(suggests_init(&error));
    }

    #[test]
    fn other_errors_do_not() {
        assert!(!suggests_init(&ConfigError::invalid_rate_limit("burst_size")));
    }
}
