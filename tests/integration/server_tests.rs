//! HTTP API tests, driven through the router with `oneshot`

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use link_ripper::config::FetcherConfig;
use link_ripper::server::{
    build_router, AppState, CountResponse, ErrorResponse, GENERIC_ERROR_MESSAGE,
    RELATIVE_URL_MESSAGE,
};
use link_ripper::storage::FileRipCounter;
use link_ripper::{RipResult, Ripper};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    router: Router,
    counter: FileRipCounter,
    _dir: TempDir,
}

fn test_app() -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let static_dir = dir.path().join("static");
    std::fs::create_dir(&static_dir).expect("Failed to create static dir");
    std::fs::write(static_dir.join("index.html"), "<h1>Link Ripper</h1>")
        .expect("Failed to write index.html");

    let config = FetcherConfig {
        timeout_secs: 5,
        connect_timeout_secs: 2,
        ..FetcherConfig::default()
    };
    let ripper = Ripper::new(&config).expect("Failed to build ripper");
    let counter = FileRipCounter::new(dir.path().join("ripCount"));

    let state = AppState::new(ripper, counter.clone());
    let router = build_router(state, &static_dir);

    TestApp {
        router,
        counter,
        _dir: dir,
    }
}

fn rip_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/rip")
        .header("content-type", "application/json")
        .body(body.into())
        .expect("Failed to build request")
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    (status, body.to_vec())
}

async fn error_message(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let (status, body) = send(router, request).await;
    let error: ErrorResponse = serde_json::from_slice(&body).expect("error body is JSON");
    (status, error.message)
}

/// Polls the counter until it reaches `expected` or a second passes
async fn wait_for_count(counter: &FileRipCounter, expected: u64) -> u64 {
    let mut count = 0;
    for _ in 0..50 {
        count = counter.read().await.expect("Failed to read counter");
        if count == expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    count
}

#[tokio::test]
async fn test_empty_body_is_rejected() {
    let app = test_app();
    let (status, message) = error_message(&app.router, rip_request(Body::empty())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message, GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = test_app();
    let (status, message) = error_message(&app.router, rip_request("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!message.is_empty());
    assert_ne!(message, GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_relative_target_is_rejected() {
    let app = test_app();
    let (status, message) =
        error_message(&app.router, rip_request(r#"{"target":"/example.html"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message, RELATIVE_URL_MESSAGE);
}

#[tokio::test]
async fn test_invalid_targets_get_generic_message() {
    let app = test_app();

    for body in [
        r#"{"target":"example.com"}"#,
        r#"{"target":""}"#,
        r#"{}"#,
        r#"{"target":"http://exa mple.com/"}"#,
    ] {
        let (status, message) = error_message(&app.router, rip_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(message, GENERIC_ERROR_MESSAGE, "body: {}", body);
    }
}

#[tokio::test]
async fn test_rip_returns_links_and_counts() {
    let app = test_app();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="https://a.com/x">x</a><a href="https://a.com/y">y</a>"#,
        ))
        .mount(&server)
        .await;

    let body = format!(r#"{{"target":"{}/"}}"#, server.uri());
    let (status, bytes) = send(&app.router, rip_request(body)).await;

    assert_eq!(status, StatusCode::OK);
    let result: RipResult = serde_json::from_slice(&bytes).expect("result body is JSON");
    assert_eq!(result.links, vec!["https://a.com/x", "https://a.com/y"]);
    assert_eq!(result.hostnames.get("a.com"), Some(&2));

    assert_eq!(wait_for_count(&app.counter, 1).await, 1);

    let count_request = Request::builder()
        .uri("/api/v1/count")
        .body(Body::empty())
        .expect("Failed to build request");
    let (status, bytes) = send(&app.router, count_request).await;
    assert_eq!(status, StatusCode::OK);
    let count: CountResponse = serde_json::from_slice(&bytes).expect("count body is JSON");
    assert_eq!(count.count, 1);
}

#[tokio::test]
async fn test_unreachable_target_answers_empty_result() {
    let app = test_app();
    let (status, bytes) = send(
        &app.router,
        rip_request(r#"{"target":"http://127.0.0.1:9/"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let result: RipResult = serde_json::from_slice(&bytes).expect("result body is JSON");
    assert!(result.is_empty());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(app.counter.read().await.expect("Failed to read counter"), 0);
}

#[tokio::test]
async fn test_count_starts_at_zero() {
    let app = test_app();
    let request = Request::builder()
        .uri("/api/v1/count")
        .body(Body::empty())
        .expect("Failed to build request");

    let (status, bytes) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    let count: CountResponse = serde_json::from_slice(&bytes).expect("count body is JSON");
    assert_eq!(count.count, 0);
}

#[tokio::test]
async fn test_corrupt_count_file_is_server_error() {
    let app = test_app();
    std::fs::write(app.counter.path(), "lots").expect("Failed to write counter");

    let request = Request::builder()
        .uri("/api/v1/count")
        .body(Body::empty())
        .expect("Failed to build request");
    let (status, bytes) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(bytes, b"Could not get ripCount");
}

#[tokio::test]
async fn test_static_files_are_served() {
    let app = test_app();
    let request = Request::builder()
        .uri("/")
        .body(Body::empty())
        .expect("Failed to build request");

    let (status, bytes) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"<h1>Link Ripper</h1>");
}
