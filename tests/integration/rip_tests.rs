//! End-to-end rips against mock pages

use link_ripper::config::FetcherConfig;
use link_ripper::ripper::{rip_channels, RipObserver};
use link_ripper::{RipOutcome, RipReport, Ripper, Termination};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> FetcherConfig {
    FetcherConfig {
        user_agent: "link-ripper-tests/1.0".to_string(),
        timeout_secs: 5,
        connect_timeout_secs: 2,
        max_token_bytes: None,
    }
}

fn ripper() -> Ripper {
    Ripper::new(&test_config()).expect("Failed to build ripper")
}

/// Mounts `html` at `page_path` and returns the full page URL
async fn mount_page(server: &MockServer, page_path: &str, status: u16, html: &str) -> Url {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(html)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;

    Url::parse(&format!("{}{}", server.uri(), page_path)).expect("Failed to parse page URL")
}

/// Counts how many times it was notified
#[derive(Default)]
struct CountingObserver {
    calls: AtomicUsize,
}

impl RipObserver for CountingObserver {
    fn on_rip_completed(&self, _report: &RipReport) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_rip_collects_links_and_hostnames() {
    let server = MockServer::start().await;
    let target = mount_page(
        &server,
        "/page",
        200,
        r##"<html><head><title>Links</title></head><body>
            <a href="https://a.com/one">One</a>
            <a href="https://a.com/two">Two</a>
            <a href="http://b.org:8080/three">Three</a>
            <a href="/local">Local</a>
            <a href="/">Home</a>
            <a href="#">Top</a>
        </body></html>"##,
    )
    .await;

    let report = ripper().rip(target.clone()).await;

    let authority = format!(
        "{}:{}",
        target.host_str().expect("mock server has a host"),
        target.port().expect("mock server has a port")
    );
    assert_eq!(
        report.result.links,
        vec![
            "https://a.com/one".to_string(),
            "https://a.com/two".to_string(),
            "http://b.org:8080/three".to_string(),
            format!("http:/{}/page/local", authority),
        ]
    );
    assert_eq!(report.result.hostnames.get("a.com"), Some(&2));
    assert_eq!(report.result.hostnames.get("b.org"), Some(&1));
    assert_eq!(report.result.hostnames.get(""), Some(&1));
    assert_eq!(report.result.hostnames.len(), 3);
    assert_eq!(
        report.outcome,
        RipOutcome::Finished {
            termination: Termination::EndOfStream
        }
    );
}

#[tokio::test]
async fn test_rip_parses_error_status_bodies() {
    let server = MockServer::start().await;
    let target = mount_page(
        &server,
        "/missing",
        404,
        r#"<h1>Not found</h1><a href="https://help.example.com/">Help</a>"#,
    )
    .await;

    let report = ripper().rip(target).await;

    assert_eq!(report.result.links, vec!["https://help.example.com/"]);
    assert!(report.outcome.is_success());
}

#[tokio::test]
async fn test_rip_page_without_anchors() {
    let server = MockServer::start().await;
    let target = mount_page(&server, "/plain", 200, "<p>No links here</p>").await;

    let report = ripper().rip(target).await;

    assert!(report.result.is_empty());
    assert!(report.outcome.is_success());
}

#[tokio::test]
async fn test_rip_keeps_links_before_truncated_markup() {
    let server = MockServer::start().await;
    let target = mount_page(
        &server,
        "/cut",
        200,
        r#"<a href="https://a.com/">A</a><a href="https://b.com/"#,
    )
    .await;

    let report = ripper().rip(target).await;

    assert_eq!(report.result.links, vec!["https://a.com/"]);
    assert!(matches!(
        report.outcome,
        RipOutcome::Finished {
            termination: Termination::Malformed(_)
        }
    ));
}

#[tokio::test]
async fn test_rip_ignores_anchors_inside_script() {
    let server = MockServer::start().await;
    let target = mount_page(
        &server,
        "/script",
        200,
        r#"<script>var s = '<a href="https://hidden.com/">';</script>
           <a href="https://shown.com/">Shown</a>"#,
    )
    .await;

    let report = ripper().rip(target).await;

    assert_eq!(report.result.links, vec!["https://shown.com/"]);
}

#[tokio::test]
async fn test_rip_unreachable_target_completes_empty() {
    // Nothing listens on the discard port
    let target = Url::parse("http://127.0.0.1:9/").expect("valid url");

    let report = tokio::time::timeout(Duration::from_secs(10), ripper().rip(target))
        .await
        .expect("rip of an unreachable target must not hang");

    assert!(report.result.is_empty());
    assert!(matches!(report.outcome, RipOutcome::FetchFailed { .. }));
}

#[tokio::test]
async fn test_spawned_worker_signals_completion_once() {
    let server = MockServer::start().await;
    let target = mount_page(&server, "/one", 200, r#"<a href="https://a.com/">A</a>"#).await;

    let ripper = ripper();
    let (sender, receivers) = rip_channels();
    let worker = ripper.spawn(target, sender);

    let (result, outcome) = link_ripper::ripper::aggregate(receivers).await;
    worker.await.expect("worker task must finish cleanly");

    assert_eq!(result.links, vec!["https://a.com/"]);
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_observer_notified_on_success_only() {
    let server = MockServer::start().await;
    let target = mount_page(&server, "/ok", 200, r#"<a href="https://a.com/">A</a>"#).await;

    let observer = Arc::new(CountingObserver::default());
    let ripper = ripper().with_observer(observer.clone());

    ripper.rip(target).await;
    assert_eq!(observer.calls.load(Ordering::SeqCst), 1);

    let unreachable = Url::parse("http://127.0.0.1:9/").expect("valid url");
    ripper.rip(unreachable).await;
    assert_eq!(observer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_token_size_limit_stops_extraction() {
    let server = MockServer::start().await;
    let long_href = format!("https://a.com/{}", "x".repeat(4096));
    let html = format!(
        r#"<a href="https://first.com/">1</a><a href="{}">2</a><a href="https://last.com/">3</a>"#,
        long_href
    );
    let target = mount_page(&server, "/big", 200, &html).await;

    let config = FetcherConfig {
        max_token_bytes: Some(1024),
        ..test_config()
    };
    let report = Ripper::new(&config)
        .expect("Failed to build ripper")
        .rip(target)
        .await;

    assert_eq!(report.result.links, vec!["https://first.com/"]);
    assert!(matches!(
        report.outcome,
        RipOutcome::Finished {
            termination: Termination::Malformed(_)
        }
    ));
}
