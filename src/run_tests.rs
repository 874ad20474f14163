//! Tests for the run module.

use super::*;
use wati::config::Cli;
use wati::webhooks::EventType;

fn config(extra: &[&str]) -> ValidatedConfig {
    let mut args = vec![
        "wati-webhook",
        "--endpoint",
        "https://live-server.wati.io",
        "--token",
        "t",
    ];
    args.extend(extra);
    ValidatedConfig::from_raw(&Cli::parse_from_iter(args), None).unwrap()
}

mod run_error {
    use super::*;

    #[test]
    fn client_error_displays_source() {
        let error = RunError::Client(ConfigError::invalid_rate_limit("burst_size"));
        assert!(error.to_string().starts_with("Failed to create API client"));
    }

    #[test]
    fn receiver_error_converts() {
        let error: RunError = WebhookError::NotRunning.into();
        assert!(matches!(error, RunError::Receiver(WebhookError::NotRunning)));
    }
}

mod registration {
    use super::*;

    #[test]
    fn absent_without_public_url() {
        assert!(registration(&config(&[])).is_none());
    }

    #[test]
    fn defaults_to_every_event() {
        let reg = registration(&config(&["--public-url", "https://hooks.example.com/wati"])).unwrap();

        assert_eq!(reg.url, "https://hooks.example.com/wati");
        assert_eq!(reg.events, EventType::ALL.to_vec());
        assert!(reg.secret.is_none());
    }

    #[test]
    fn carries_secret_and_chosen_events() {
        let reg = registration(&config(&[
            "--public-url",
            "https://hooks.example.com/wati",
            "--secret",
            "s3cret",
            "--event",
            "message_received",
            "--event",
            "message_read",
        ]))
        .unwrap();

        assert_eq!(reg.events, [EventType::MessageReceived, EventType::MessageRead]);
        assert_eq!(reg.secret.as_deref(), Some("s3cret"));
        assert!(reg.validate().is_ok());
    }
}

mod logging {
    use super::*;

    #[test]
    fn message_summary_includes_sender_and_text() {
        let event = WebhookEvent::test_message(chrono::Utc::now());
        assert_eq!(
            summarize(&event),
            "text from 1234567890: This is a test message from WATI webhook"
        );
    }

    #[test]
    fn status_summary() {
        let event = WebhookEvent::from_slice(
            br#"{"id":"e","type":"message_delivered","data":{"messageId":"wamid.7","status":"delivered"}}"#,
        )
        .unwrap();
        assert_eq!(summarize(&event), "message wamid.7 is now delivered");
    }

    #[test]
    fn other_events_name_their_type() {
        let event = WebhookEvent::from_slice(br#"{"id":"e","type":"contact_created"}"#).unwrap();
        assert_eq!(summarize(&event), "contact_created event received");
    }

    #[test]
    fn log_handler_accepts_any_event() {
        let event = WebhookEvent::from_slice(br#"{"id":"e","type":"payment_captured"}"#).unwrap();
        assert!(log_handler()(&event).is_ok());
    }
}
