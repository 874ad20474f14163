//! Tests for HTTP request/response types.

use super::{HttpRequest, HttpResponse};

mod http_request {
    use super::*;

    #[test]
    fn new_starts_without_headers_or_body() {
        let url = url::Url::parse("https://example.com/api").unwrap();
        let req = HttpRequest::new(http::Method::DELETE, url.clone());

        assert_eq!(req.method, http::Method::DELETE);
        assert_eq!(req.url, url);
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn with_header_replaces_existing_value() {
        let url = url::Url::parse("https://example.com/").unwrap();
        let req = HttpRequest::get(url)
            .with_header(
                http::header::ACCEPT,
                http::HeaderValue::from_static("text/html"),
            )
            .with_header(
                http::header::ACCEPT,
                http::HeaderValue::from_static("application/json"),
            );

        assert_eq!(req.headers.get_all(http::header::ACCEPT).iter().count(), 1);
        assert_eq!(req.headers[http::header::ACCEPT], "application/json");
    }

    #[test]
    fn post_with_body() {
        let url = url::Url::parse("https://example.com/").unwrap();
        let req = HttpRequest::post(url).with_body(b"{}".to_vec());

        assert_eq!(req.method, http::Method::POST);
        assert_eq!(req.body.as_deref(), Some(&b"{}"[..]));
    }
}

mod http_response {
    use super::*;

    #[test]
    fn success_range() {
        assert!(HttpResponse::with_status(http::StatusCode::NO_CONTENT, "").is_success());
        assert!(!HttpResponse::with_status(http::StatusCode::BAD_REQUEST, "").is_success());
    }

    #[test]
    fn body_text_rejects_invalid_utf8() {
        let resp = HttpResponse::with_status(http::StatusCode::OK, vec![0xff, 0xfe]);
        assert!(resp.body_text().is_none());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let mut headers = http::HeaderMap::new();
        headers.insert(http::header::CONTENT_TYPE, http::HeaderValue::from_static("text/plain"));
        let resp = HttpResponse::new(http::StatusCode::OK, headers, Vec::new());

        assert_eq!(resp.header("Content-Type"), Some("text/plain"));
        assert_eq!(resp.header("x-missing"), None);
    }
}
