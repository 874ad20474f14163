//! Tests for validated configuration.

use std::io::Write;
use std::time::Duration;

use tempfile::{NamedTempFile, tempdir};

use crate::webhooks::EventType;

use super::ConfigError;
use super::cli::Cli;
use super::toml::TomlConfig;
use super::validated::{ValidatedConfig, write_default_config};

/// Helper to create CLI args from a slice
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["wati-webhook"];
    full_args.extend(args);
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}

const REQUIRED: [&str; 4] = ["--endpoint", "https://api.example.com/", "--token", "t"];

mod required_fields {
    use super::*;

    #[test]
    fn missing_endpoint_returns_error() {
        let cli = cli(&["--token", "t"]);
        let result = ValidatedConfig::from_raw(&cli, None);

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired {
                field: "endpoint",
                ..
            })
        ));
    }

    #[test]
    fn missing_token_returns_error() {
        let cli = cli(&["--endpoint", "https://api.example.com"]);
        let result = ValidatedConfig::from_raw(&cli, None);

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired { field: "token", .. })
        ));
    }

    #[test]
    fn required_fields_from_toml() {
        let toml = toml(
            r#"
            [api]
            endpoint = "https://api.example.com"
            token = "file-token"
        "#,
        );

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert_eq!(config.client.endpoint, "https://api.example.com");
        assert_eq!(config.client.token, "file-token");
    }
}

mod precedence {
    use super::*;

    #[test]
    fn defaults_apply_without_overrides() {
        let config = ValidatedConfig::from_raw(&cli(&REQUIRED), None).unwrap();

        assert_eq!(config.client.endpoint, "https://api.example.com");
        assert_eq!(config.client.timeout, Duration::from_secs(30));
        assert_eq!(config.client.retry_count, 3);
        assert_eq!(config.webhook.port, 8080);
        assert!(config.webhook.secret.is_none());
        assert!(config.webhook.events.is_empty());
    }

    #[test]
    fn cli_beats_toml() {
        let toml = toml(
            r#"
            [api]
            endpoint = "https://file.example.com"
            token = "file-token"
            timeout = 60
            retry_count = 1

            [webhook]
            port = 7000
        "#,
        );
        let mut args = REQUIRED.to_vec();
        args.extend(["--timeout", "5", "--port", "7001"]);

        let config = ValidatedConfig::from_raw(&cli(&args), Some(&toml)).unwrap();

        assert_eq!(config.client.endpoint, "https://api.example.com");
        assert_eq!(config.client.token, "t");
        assert_eq!(config.client.timeout, Duration::from_secs(5));
        assert_eq!(config.client.retry_count, 1);
        assert_eq!(config.webhook.port, 7001);
    }

    #[test]
    fn cli_events_replace_toml_events() {
        let toml = toml(
            r#"
            [webhook]
            events = ["contact_created", "contact_updated"]
        "#,
        );
        let mut args = REQUIRED.to_vec();
        args.extend(["--event", "message_read"]);

        let config = ValidatedConfig::from_raw(&cli(&args), Some(&toml)).unwrap();

        assert_eq!(config.webhook.events, vec![EventType::MessageRead]);
    }

    #[test]
    fn rate_limit_and_user_agent_come_from_toml() {
        let toml = toml(
            r#"
            [api]
            user_agent = "daemon/2"

            [api.rate_limit]
            requests_per_second = 3
            burst_size = 4
        "#,
        );

        let config = ValidatedConfig::from_raw(&cli(&REQUIRED), Some(&toml)).unwrap();

        assert_eq!(config.client.rate_limit.requests_per_second, 3);
        assert_eq!(config.client.rate_limit.burst_size, 4);
        assert_eq!(config.client.user_agent, "daemon/2");
    }

    #[test]
    fn debug_flag_uses_or_semantics() {
        let toml = toml("[api]\ndebug = true\n");
        let config = ValidatedConfig::from_raw(&cli(&REQUIRED), Some(&toml)).unwrap();
        assert!(config.client.debug);
    }

    #[test]
    fn empty_secret_is_treated_as_unset() {
        let mut args = REQUIRED.to_vec();
        args.extend(["--secret", ""]);
        let config = ValidatedConfig::from_raw(&cli(&args), None).unwrap();
        assert!(config.webhook.secret.is_none());
    }
}

mod invalid_values {
    use super::*;

    #[test]
    fn unknown_event_is_rejected() {
        let mut args = REQUIRED.to_vec();
        args.extend(["--event", "message_teleported"]);

        let result = ValidatedConfig::from_raw(&cli(&args), None);

        assert!(matches!(result, Err(ConfigError::InvalidEvent { value }) if value == "message_teleported"));
    }

    #[test]
    fn invalid_public_url_is_rejected() {
        let mut args = REQUIRED.to_vec();
        args.extend(["--public-url", "not a url"]);

        let result = ValidatedConfig::from_raw(&cli(&args), None);

        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut args = REQUIRED.to_vec();
        args.extend(["--timeout", "0"]);

        let result = ValidatedConfig::from_raw(&cli(&args), None);

        assert!(matches!(result, Err(ConfigError::InvalidDuration { .. })));
    }
}

mod subscriptions {
    use super::*;

    #[test]
    fn empty_event_list_subscribes_to_everything() {
        let config = ValidatedConfig::from_raw(&cli(&REQUIRED), None).unwrap();
        assert_eq!(config.subscribed_events().len(), EventType::ALL.len());
    }

    #[test]
    fn display_mentions_endpoint_and_port() {
        let config = ValidatedConfig::from_raw(&cli(&REQUIRED), None).unwrap();
        let text = config.to_string();
        assert!(text.contains("https://api.example.com"));
        assert!(text.contains("port: 8080"));
        assert!(!text.contains("token"));
    }
}

mod config_load {
    use super::*;

    #[test]
    fn load_from_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [api]
            endpoint = "https://api.example.com"
            token = "from-file"
        "#
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = ValidatedConfig::load(&cli(&["--config", &path])).unwrap();

        assert_eq!(config.client.token, "from-file");
    }

    #[test]
    fn missing_config_file_returns_read_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let result = ValidatedConfig::load(&cli(&["--config", path.to_str().unwrap()]));

        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }

    #[test]
    fn write_default_config_creates_parseable_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wati-webhook.toml");

        write_default_config(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(TomlConfig::parse(&content).is_ok());
    }
}
