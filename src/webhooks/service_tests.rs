use std::sync::Arc;

use http::Method;
use serde_json::json;

use super::*;
use crate::api::mock::{MockExecutor, json_body};
use crate::api::{ApiError, Error};
use crate::context::Context;

fn service() -> (WebhookService<MockExecutor>, Arc<MockExecutor>) {
    let executor = MockExecutor::new();
    (WebhookService::new(Arc::clone(&executor)), executor)
}

mod remote {
    use super::*;

    #[tokio::test]
    async fn register_posts_registration() {
        let (svc, executor) = service();

        svc.register_webhook(
            &Context::background(),
            "https://example.com/hook",
            vec![EventType::MessageReceived, EventType::MessageRead],
        )
        .await
        .unwrap();

        let req = executor.last();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/api/v1/webhooks");
        assert_eq!(
            json_body(&req),
            json!({"url": "https://example.com/hook", "events": ["message_received", "message_read"]})
        );
    }

    #[tokio::test]
    async fn register_with_secret_and_description() {
        let (svc, executor) = service();
        let reg = WebhookRegistration::new("https://h", vec![EventType::ContactCreated])
            .with_secret("s3cret")
            .with_description("crm sync");

        svc.register_webhook_with_config(&Context::background(), &reg)
            .await
            .unwrap();

        let body = json_body(&executor.last());
        assert_eq!(body["secret"], "s3cret");
        assert_eq!(body["description"], "crm sync");
    }

    #[tokio::test]
    async fn invalid_registration_sends_nothing() {
        let (svc, executor) = service();

        let err = svc
            .register_webhook(&Context::background(), "", Vec::new())
            .await
            .unwrap_err();

        let Error::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn unregister_sends_url_in_body() {
        let (svc, executor) = service();

        svc.unregister_webhook(&Context::background(), "https://h")
            .await
            .unwrap();

        let req = executor.last();
        assert_eq!(req.method, Method::DELETE);
        assert_eq!(req.path, "/api/v1/webhooks");
        assert_eq!(json_body(&req), json!({"url": "https://h"}));
    }

    #[tokio::test]
    async fn unregister_requires_url() {
        let (svc, executor) = service();

        let err = svc
            .unregister_webhook(&Context::background(), "  ")
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Validation error for field 'url': webhook URL is required"
        );
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn list_returns_webhooks() {
        let (svc, executor) = service();
        executor.respond(json!({
            "result": true,
            "webhooks": [
                {"url": "https://a", "events": ["message_received"], "isActive": true},
                {"url": "https://b", "events": ["chatbot_started"], "isActive": false}
            ]
        }));

        let hooks = svc.list_webhooks(&Context::background()).await.unwrap();

        assert_eq!(executor.last().method, Method::GET);
        assert_eq!(hooks.len(), 2);
        assert_eq!(hooks[1].url, "https://b");
        assert!(!hooks[1].is_active);
    }

    #[tokio::test]
    async fn api_errors_pass_through() {
        let (svc, executor) = service();
        executor.fail(ApiError::new(403, "forbidden").into());

        let err = svc.list_webhooks(&Context::background()).await.unwrap_err();

        assert_eq!(err.category(), Some(crate::api::ErrorCategory::Authorization));
    }
}

mod local {
    use super::*;

    #[test]
    fn message_handlers_cover_both_inbound_types() {
        let (svc, _) = service();

        svc.register_message_handlers(
            Some(message_handler(|_| Ok(()))),
            Some(message_status_handler(|_| Ok(()))),
            None,
        );
        assert_eq!(svc.handler_count(), 3);

        let event = json!({
            "id": "e1",
            "type": "new_contact_message",
            "data": {"messageId": "m", "messageType": "text", "text": "first!"}
        });
        let body = serde_json::to_vec(&event).unwrap();
        assert!(svc.handle_webhook(&body, "").is_ok());
    }

    #[test]
    fn all_event_handlers() {
        let (svc, _) = service();
        svc.register_all_event_handlers(&handler(|_| Ok(())));
        assert_eq!(svc.handler_count(), EventType::ALL.len());

        svc.unregister_handler(&EventType::ChatStatusChanged);
        assert_eq!(svc.handler_count(), EventType::ALL.len() - 1);
    }

    #[test]
    fn secret_applies_to_signature_checks() {
        let (svc, _) = service();
        assert!(svc.validate_webhook_signature(b"body", "anything"));

        svc.set_secret("k");
        assert!(!svc.validate_webhook_signature(b"body", "anything"));
        assert!(svc.validate_webhook_signature(b"body", &sign_payload("k", b"body").unwrap()));
    }

    #[tokio::test]
    async fn server_lifecycle_through_service() {
        let (svc, _) = service();

        let port = svc
            .start_server(0, std::collections::HashMap::new())
            .await
            .unwrap();
        assert!(svc.is_running());
        assert_eq!(svc.port(), port);
        assert!(svc.receiver().is_running());

        svc.stop_server().await.unwrap();
        assert!(!svc.is_running());
    }
}
