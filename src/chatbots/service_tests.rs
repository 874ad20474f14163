use std::sync::Arc;

use http::Method;
use serde_json::json;

use super::*;
use crate::api::mock::{MockExecutor, json_body};
use crate::api::Error;
use crate::context::Context;

const PHONE: &str = "5511999999999";

fn service() -> (ChatbotsService<MockExecutor>, Arc<MockExecutor>) {
    let executor = MockExecutor::new();
    (ChatbotsService::new(Arc::clone(&executor)), executor)
}

fn validation_messages(err: Error) -> Vec<String> {
    let Error::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    errors.errors().iter().map(|e| e.message.clone()).collect()
}

fn chatbots() -> serde_json::Value {
    json!({
        "result": true,
        "chatbots": [
            {"id": "b1", "name": "Sales", "status": "active", "keywords": ["price", "buy"]},
            {"id": "b2", "name": "Support", "status": "INACTIVE", "keywords": ["help"]},
            {"id": "b3", "name": "Faq", "status": "ACTIVE", "keywords": ["help"]}
        ]
    })
}

mod definitions {
    use super::*;

    #[tokio::test]
    async fn get_chatbot_unwraps_envelope() {
        let (svc, executor) = service();
        executor.respond(json!({"result": true, "chatbot": {"id": "b1", "name": "Sales"}}));

        let bot = svc.get_chatbot(&Context::background(), "b1").await.unwrap();

        assert_eq!(bot.name, "Sales");
        assert_eq!(executor.last().path, "/api/v1/chatbots/b1");
    }

    #[tokio::test]
    async fn empty_id_is_rejected_locally() {
        let (svc, executor) = service();
        let ctx = Context::background();

        let err = svc.delete_chatbot(&ctx, "").await.unwrap_err();
        assert_eq!(validation_messages(err), ["chatbot ID is required"]);
        assert!(matches!(svc.stop_chatbot(&ctx, "").await, Err(Error::Validation(_))));
        assert!(matches!(svc.activate_chatbot(&ctx, "").await, Err(Error::Validation(_))));
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn create_validates_responses() {
        let (svc, executor) = service();
        let req = CreateChatbotRequest {
            name: String::new(),
            responses: vec![Response::new("", "hello"), Response::new("hi", "")],
            ..CreateChatbotRequest::default()
        };

        let err = svc
            .create_chatbot(&Context::background(), &req)
            .await
            .unwrap_err();

        assert_eq!(
            validation_messages(err),
            [
                "name is required",
                "trigger is required for response 0",
                "message is required for response 1"
            ]
        );
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn create_needs_keyword_or_response() {
        let (svc, _) = service();
        let req = CreateChatbotRequest {
            name: "Empty".to_string(),
            ..CreateChatbotRequest::default()
        };

        let err = svc
            .create_chatbot(&Context::background(), &req)
            .await
            .unwrap_err();

        assert_eq!(
            validation_messages(err),
            ["at least one keyword or response is required"]
        );
    }

    #[tokio::test]
    async fn create_posts_definition() {
        let (svc, executor) = service();
        executor.respond(json!({"result": true, "chatbot": {"id": "new", "name": "Sales"}}));
        let req = CreateChatbotRequest {
            name: "Sales".to_string(),
            keywords: vec!["price".to_string()],
            is_active: true,
            ..CreateChatbotRequest::default()
        };

        let bot = svc.create_chatbot(&Context::background(), &req).await.unwrap();

        assert_eq!(bot.id, "new");
        let req = executor.last();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/api/v1/chatbots");
        assert_eq!(
            json_body(&req),
            json!({"name": "Sales", "keywords": ["price"], "isActive": true})
        );
    }

    #[tokio::test]
    async fn deactivate_sends_only_flag() {
        let (svc, executor) = service();

        svc.deactivate_chatbot(&Context::background(), "b1")
            .await
            .unwrap();

        let req = executor.last();
        assert_eq!(req.method, Method::PUT);
        assert_eq!(req.path, "/api/v1/chatbots/b1");
        assert_eq!(json_body(&req), json!({"isActive": false}));
    }

    #[tokio::test]
    async fn keyword_and_response_updates() {
        let (svc, executor) = service();
        let ctx = Context::background();

        svc.update_chatbot_keywords(&ctx, "b1", vec!["menu".to_string()])
            .await
            .unwrap();
        assert_eq!(json_body(&executor.last()), json!({"keywords": ["menu"]}));

        svc.update_chatbot_responses(&ctx, "b1", vec![Response::new("hi", "hello")])
            .await
            .unwrap();
        assert_eq!(
            json_body(&executor.last()),
            json!({"responses": [{"id": "", "trigger": "hi", "message": "hello", "isActive": true}]})
        );
    }

    #[tokio::test]
    async fn delete_and_stop_paths() {
        let (svc, executor) = service();
        let ctx = Context::background();

        svc.delete_chatbot(&ctx, "b1").await.unwrap();
        svc.stop_chatbot(&ctx, "b1").await.unwrap();

        let reqs = executor.requests();
        assert_eq!(reqs[0].method, Method::DELETE);
        assert_eq!(reqs[0].path, "/api/v1/chatbots/b1");
        assert_eq!(reqs[1].method, Method::POST);
        assert_eq!(reqs[1].path, "/api/v1/stopChatbot/b1");
        assert!(reqs[1].body.is_none());
    }
}

mod queries {
    use super::*;

    #[tokio::test]
    async fn active_chatbots() {
        let (svc, executor) = service();
        executor.respond(chatbots());

        let active = svc.get_active_chatbots(&Context::background()).await.unwrap();

        let ids: Vec<_> = active.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["b1", "b3"]);
        assert_eq!(executor.last().path, "/api/v1/chatbots");
    }

    #[tokio::test]
    async fn by_name() {
        let (svc, executor) = service();
        executor.respond(chatbots());
        executor.respond(chatbots());
        let ctx = Context::background();

        assert_eq!(svc.get_chatbot_by_name(&ctx, "Support").await.unwrap().id, "b2");

        let err = svc.get_chatbot_by_name(&ctx, "Billing").await.unwrap_err();
        let api = err.api_error().unwrap();
        assert!(api.is_not_found_error());
        assert_eq!(api.message, "chatbot with name 'Billing' not found");
    }

    #[tokio::test]
    async fn by_keyword() {
        let (svc, executor) = service();
        executor.respond(chatbots());
        let ctx = Context::background();

        let found = svc.get_chatbots_by_keyword(&ctx, "help").await.unwrap();
        let ids: Vec<_> = found.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["b2", "b3"]);

        let err = svc.get_chatbots_by_keyword(&ctx, "").await.unwrap_err();
        assert_eq!(validation_messages(err), ["keyword is required"]);
        assert_eq!(executor.call_count(), 1);
    }
}

mod sessions {
    use super::*;

    #[tokio::test]
    async fn start_with_message() {
        let (svc, executor) = service();
        executor.respond(json!({"result": true, "sessionId": "s1", "status": "started"}));

        let resp = svc
            .start_chatbot_with_message(&Context::background(), "b1", PHONE, "Hola")
            .await
            .unwrap();

        assert_eq!(resp.session_id.as_deref(), Some("s1"));
        let req = executor.last();
        assert_eq!(req.path, "/api/v1/startChatbot");
        assert_eq!(
            json_body(&req),
            json!({"chatbotId": "b1", "whatsappNumber": PHONE, "initialMessage": "Hola"})
        );
    }

    #[tokio::test]
    async fn start_validates() {
        let (svc, executor) = service();

        let err = svc
            .start_chatbot_for_contact(&Context::background(), "", "123")
            .await
            .unwrap_err();

        assert_eq!(
            validation_messages(err),
            ["chatbotId is required", "whatsappNumber must be at least 10 digits"]
        );
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn transfer_to_human() {
        let (svc, executor) = service();
        executor.respond(json!({
            "result": true,
            "whatsappNumber": PHONE,
            "status": "ASSIGNED",
            "assignedTo": "agent-7",
            "updatedAt": "2024-05-01T10:00:00Z"
        }));

        let resp = svc
            .transfer_chat_to_human(&Context::background(), PHONE, "agent-7", "wants refund")
            .await
            .unwrap();

        assert_eq!(resp.assigned_to.as_deref(), Some("agent-7"));
        assert!(resp.updated_at.is_some());
        let req = executor.last();
        assert_eq!(req.path, "/api/v1/updateChatStatus");
        assert_eq!(
            json_body(&req),
            json!({
                "whatsappNumber": PHONE,
                "status": "ASSIGNED",
                "assignedTo": "agent-7",
                "notes": "wants refund"
            })
        );
    }

    #[tokio::test]
    async fn status_shortcuts() {
        let (svc, executor) = service();
        let ctx = Context::background();

        svc.close_chat_session(&ctx, PHONE, "").await.unwrap();
        svc.resolve_chat_session(&ctx, PHONE, "done").await.unwrap();
        svc.assign_chat_to_user(&ctx, PHONE, "u1").await.unwrap();
        svc.add_tags_to_chat(&ctx, PHONE, vec!["vip".to_string()])
            .await
            .unwrap();

        let bodies: Vec<_> = executor.requests().iter().map(json_body).collect();
        assert_eq!(bodies[0], json!({"whatsappNumber": PHONE, "status": "CLOSED"}));
        assert_eq!(bodies[1]["status"], "RESOLVED");
        assert_eq!(bodies[1]["notes"], "done");
        assert_eq!(bodies[2]["assignedTo"], "u1");
        assert_eq!(bodies[3], json!({"whatsappNumber": PHONE, "status": "OPEN", "tags": ["vip"]}));
    }

    #[tokio::test]
    async fn unknown_status_is_rejected() {
        let (svc, executor) = service();
        let req = UpdateChatStatusRequest {
            whatsapp_number: PHONE.to_string(),
            status: String::new(),
            ..UpdateChatStatusRequest::default()
        };

        let err = svc
            .update_chat_status(&Context::background(), &req)
            .await
            .unwrap_err();

        assert_eq!(validation_messages(err), ["status is required"]);
        assert_eq!(executor.call_count(), 0);
    }
}
