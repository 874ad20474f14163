//! Tests for the request executor with a scripted HTTP client.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::Deserialize;

use super::{ApiExecutor, ApiRequest, BaseResponse, Error, ErrorCategory, Executor};
use crate::config::{ClientConfig, ConfigError};
use crate::context::{Context, ContextError};
use crate::time::{InstantSleeper, Sleeper};
use crate::transport::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Mock HTTP client that returns a configurable sequence of responses.
#[derive(Debug)]
struct MockClient {
    responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    call_count: AtomicUsize,
}

impl MockClient {
    fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn captured_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for MockClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(req);
        self.responses.lock().unwrap().remove(0)
    }
}

/// Sleeper that records requested delays without waiting.
#[derive(Debug, Default)]
struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl Sleeper for Arc<RecordingSleeper> {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

fn status(code: u16, body: &str) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse::with_status(
        http::StatusCode::from_u16(code).unwrap(),
        body,
    ))
}

fn config() -> ClientConfig {
    ClientConfig::new("https://api.example.com/", "secret-token").with_rate_limit(1000, 1000)
}

fn executor(client: &Arc<MockClient>) -> Executor<Arc<MockClient>, InstantSleeper> {
    Executor::new(&config(), Arc::clone(client))
        .unwrap()
        .with_sleeper(InstantSleeper)
}

mod request_construction {
    use super::*;

    #[tokio::test]
    async fn sets_auth_json_and_user_agent_headers() {
        let client = MockClient::new(vec![status(200, r#"{"result":true}"#)]);
        let exec = executor(&client);

        exec.execute_discarding(&Context::background(), ApiRequest::get("/api/v1/chatbots"))
            .await
            .unwrap();

        let req = &client.captured_requests()[0];
        assert_eq!(req.method, http::Method::GET);
        assert_eq!(req.url.as_str(), "https://api.example.com/api/v1/chatbots");
        assert_eq!(req.headers[http::header::AUTHORIZATION], "Bearer secret-token");
        assert_eq!(req.headers[http::header::CONTENT_TYPE], "application/json");
        assert_eq!(req.headers[http::header::ACCEPT], "application/json");
        assert_eq!(
            req.headers[http::header::USER_AGENT],
            crate::config::defaults::USER_AGENT
        );
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn serializes_json_body() {
        let client = MockClient::new(vec![status(200, "{}")]);
        let exec = executor(&client);
        let request = ApiRequest::post("/api/v1/addContact")
            .json(&serde_json::json!({"name": "Ada"}))
            .unwrap();

        exec.execute_discarding(&Context::background(), request)
            .await
            .unwrap();

        let req = &client.captured_requests()[0];
        assert_eq!(req.body.as_deref(), Some(&br#"{"name":"Ada"}"#[..]));
    }

    #[tokio::test]
    async fn raw_body_keeps_its_content_type() {
        let client = MockClient::new(vec![status(200, "{}")]);
        let exec = executor(&client);
        let request =
            ApiRequest::post("/api/v1/uploadMedia").raw("multipart/form-data; boundary=x", vec![1]);

        exec.execute_discarding(&Context::background(), request)
            .await
            .unwrap();

        let req = &client.captured_requests()[0];
        assert_eq!(
            req.headers[http::header::CONTENT_TYPE],
            "multipart/form-data; boundary=x"
        );
        assert_eq!(req.headers[http::header::ACCEPT], "application/json");
    }

    #[tokio::test]
    async fn hot_swapped_token_and_endpoint_apply_to_next_call() {
        let client = MockClient::new(vec![status(200, "{}")]);
        let exec = executor(&client);

        exec.set_token("rotated").unwrap();
        exec.set_endpoint("https://other.example.com/").unwrap();
        exec.execute_discarding(&Context::background(), ApiRequest::get("/x"))
            .await
            .unwrap();

        let req = &client.captured_requests()[0];
        assert_eq!(req.url.as_str(), "https://other.example.com/x");
        assert_eq!(req.headers[http::header::AUTHORIZATION], "Bearer rotated");
        assert_eq!(exec.token(), "rotated");
        assert_eq!(exec.endpoint(), "https://other.example.com");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let client = MockClient::new(vec![]);
        let result = Executor::new(&ClientConfig::new("https://api.example.com", ""), client);
        assert!(matches!(result, Err(ConfigError::MissingRequired { .. })));
    }
}

mod responses {
    use super::*;

    #[tokio::test]
    async fn success_body_decodes_into_target() {
        let client = MockClient::new(vec![status(200, r#"{"result":true,"message":"success"}"#)]);
        let exec = executor(&client);

        let out: BaseResponse = exec
            .execute(&Context::background(), ApiRequest::get("/x"))
            .await
            .unwrap();

        assert!(out.result);
        assert_eq!(out.message.as_deref(), Some("success"));
    }

    #[tokio::test]
    async fn bad_request_is_classified() {
        let client = MockClient::new(vec![status(
            400,
            r#"{"result":false,"error":"invalid request"}"#,
        )]);
        let exec = executor(&client);

        let err = exec
            .execute::<BaseResponse>(&Context::background(), ApiRequest::get("/x"))
            .await
            .unwrap_err();

        let api = err.api_error().unwrap();
        assert_eq!(api.category, ErrorCategory::BadRequest);
        assert_eq!(api.message, "invalid request");
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn malformed_success_body_is_decode_error() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Strict {
            result: bool,
        }

        let client = MockClient::new(vec![status(200, "not json")]);
        let exec = executor(&client);

        let err = exec
            .execute::<Strict>(&Context::background(), ApiRequest::get("/x"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn redirect_status_is_not_an_error() {
        let client = MockClient::new(vec![status(304, "")]);
        let exec = executor(&client);

        let body = exec
            .execute_request(&Context::background(), ApiRequest::get("/x"))
            .await
            .unwrap();

        assert!(body.is_empty());
    }
}

mod retries {
    use super::*;

    #[tokio::test]
    async fn server_errors_then_success_makes_three_calls() {
        let client = MockClient::new(vec![
            status(500, "{}"),
            status(500, "{}"),
            status(200, r#"{"result":true}"#),
        ]);
        let exec = executor(&client);

        let out: BaseResponse = exec
            .execute(&Context::background(), ApiRequest::get("/x"))
            .await
            .unwrap();

        assert!(out.result);
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn backoff_is_linear() {
        let client = MockClient::new(vec![
            Err(HttpError::Timeout),
            status(429, "{}"),
            status(503, "{}"),
            status(200, "{}"),
        ]);
        let sleeper = Arc::new(RecordingSleeper::default());
        let exec = Executor::new(&config(), Arc::clone(&client))
            .unwrap()
            .with_sleeper(Arc::clone(&sleeper));

        exec.execute_discarding(&Context::background(), ApiRequest::get("/x"))
            .await
            .unwrap();

        assert_eq!(
            *sleeper.delays.lock().unwrap(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3)
            ]
        );
    }

    #[tokio::test]
    async fn client_error_is_not_retried() {
        let client = MockClient::new(vec![status(404, r#"{"message":"no such contact"}"#)]);
        let exec = executor(&client);

        let err = exec
            .execute_discarding(&Context::background(), ApiRequest::get("/x"))
            .await
            .unwrap_err();

        assert_eq!(err.category(), Some(ErrorCategory::NotFound));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn exhausted_transport_errors_become_network_error() {
        let client = MockClient::new(vec![
            Err(HttpError::Timeout),
            Err(HttpError::Timeout),
            Err(HttpError::Timeout),
            Err(HttpError::Timeout),
        ]);
        let exec = executor(&client);

        let err = exec
            .execute_discarding(&Context::background(), ApiRequest::delete("/api/v1/x"))
            .await
            .unwrap_err();

        let Error::Network(network) = err else {
            panic!("expected network error, got {err:?}");
        };
        assert_eq!(network.operation, "DELETE /api/v1/x");
        assert_eq!(client.calls(), 4);
    }

    #[tokio::test]
    async fn exhausted_server_errors_surface_last_response() {
        let client = MockClient::new(vec![
            status(500, "{}"),
            status(502, r#"{"error":"upstream"}"#),
        ]);
        let exec = Executor::new(&config().with_retry_count(1), Arc::clone(&client))
            .unwrap()
            .with_sleeper(InstantSleeper);

        let err = exec
            .execute_discarding(&Context::background(), ApiRequest::get("/x"))
            .await
            .unwrap_err();

        let api = err.api_error().unwrap();
        assert_eq!(api.status, 502);
        assert_eq!(api.message, "upstream");
    }

    #[tokio::test]
    async fn zero_retry_count_makes_single_attempt() {
        let client = MockClient::new(vec![status(500, "{}")]);
        let exec = Executor::new(&config().with_retry_count(0), Arc::clone(&client))
            .unwrap()
            .with_sleeper(InstantSleeper);

        let err = exec
            .execute_discarding(&Context::background(), ApiRequest::get("/x"))
            .await
            .unwrap_err();

        assert_eq!(err.category(), Some(ErrorCategory::ServerError));
        assert_eq!(client.calls(), 1);
    }
}

mod cancellation {
    use super::*;

    #[tokio::test]
    async fn cancelled_context_fails_before_sending() {
        let client = MockClient::new(vec![status(200, "{}")]);
        let exec = executor(&client);
        let ctx = Context::background();
        ctx.cancel();

        let err = exec
            .execute_discarding(&ctx, ApiRequest::get("/x"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled(ContextError::Cancelled)));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_interrupts_backoff() {
        let client = MockClient::new(vec![status(500, "{}"), status(200, "{}")]);
        let exec = Executor::new(&config(), Arc::clone(&client)).unwrap();
        let ctx = Context::with_timeout(Duration::from_millis(500));

        let err = exec
            .execute_discarding(&ctx, ApiRequest::get("/x"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Cancelled(ContextError::DeadlineExceeded)
        ));
        assert_eq!(client.calls(), 1);
    }
}
