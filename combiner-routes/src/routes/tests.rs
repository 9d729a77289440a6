//! Contract tests for the HTTP surface: status codes, headers and bodies.
#![allow(unused_variables)]

use super::*;
use axum::http::HeaderValue;
use axum_test::TestServer;
use combiner_clients::HealthCheck;
use combiner_core::result::{PublishError, PublishResult};
use error_stack::Report;
use mockall::automock;
use mockall::predicate::{always, eq};
use rstest::rstest;

const CONTENT_UUID: &str = "0cef259d-030d-497d-b4ef-e8fa0ee6db6b";

struct Publisher;

#[automock]
impl ForcePublisher for Publisher {
    async fn force_publish(&self, uuid: &str, tid: Option<String>) -> PublishResult<()> {
        unreachable!()
    }
}

fn server_with(publisher: MockPublisher, checks: Vec<HealthCheck>) -> TestServer {
    let health = HealthChecker::new(reqwest::Client::new(), checks);
    TestServer::new(build(CombinerAppState::new_without_metrics(publisher, health))).unwrap()
}

fn server(publisher: MockPublisher) -> TestServer {
    server_with(publisher, vec![])
}

fn unreachable_check() -> HealthCheck {
    HealthCheck::good_to_go(
        "Check connectivity to document-store-api",
        "http://127.0.0.1:1",
        "CombinedPostPublication messages can't be constructed.",
        "Document-store-api is not reachable.",
    )
}

#[tokio::test]
async fn force_publish_passes_the_transaction_id() {
    let mut publisher = MockPublisher::new();
    publisher
        .expect_force_publish()
        .with(eq(CONTENT_UUID), eq(Some("tid_test".to_string())))
        .once()
        .returning(|_, _| Ok(()));
    let server = server(publisher);

    let response = server
        .post(&format!("/{CONTENT_UUID}"))
        .add_header(TRANSACTION_ID, HeaderValue::from_static("tid_test"))
        .await;

    assert_eq!(StatusCode::OK, response.status_code());
}

#[tokio::test]
async fn force_publish_without_transaction_id() {
    let mut publisher = MockPublisher::new();
    publisher
        .expect_force_publish()
        .with(eq(CONTENT_UUID), eq(None))
        .once()
        .returning(|_, _| Ok(()));
    let server = server(publisher);

    let response = server.post(&format!("/{CONTENT_UUID}")).await;

    assert_eq!(StatusCode::OK, response.status_code());
}

#[tokio::test]
async fn invalid_uuid_is_a_bad_request() {
    let mut publisher = MockPublisher::new();
    publisher.expect_force_publish().never();
    let server = server(publisher);

    let response = server.post("/not-a-uuid").await;

    assert_eq!(StatusCode::BAD_REQUEST, response.status_code());
}

#[rstest]
#[case::not_found(PublishError::NotFound, StatusCode::NOT_FOUND)]
#[case::invalid_content_type(PublishError::InvalidContentType, StatusCode::UNPROCESSABLE_ENTITY)]
#[case::combine(PublishError::Combine, StatusCode::INTERNAL_SERVER_ERROR)]
#[case::forward(PublishError::Forward, StatusCode::INTERNAL_SERVER_ERROR)]
#[tokio::test]
async fn publish_failures_map_to_status(#[case] error: PublishError, #[case] expected: StatusCode) {
    let mut publisher = MockPublisher::new();
    publisher
        .expect_force_publish()
        .with(eq(CONTENT_UUID), always())
        .once()
        .return_once(move |_, _| Err(Report::new(error)));
    let server = server(publisher);

    let response = server.post(&format!("/{CONTENT_UUID}")).await;

    assert_eq!(expected, response.status_code());
}

#[tokio::test]
async fn ping_pongs() {
    let response = server(MockPublisher::new()).get("/__ping").await;

    assert_eq!(StatusCode::OK, response.status_code());
    assert_eq!("pong", response.text());
}

#[tokio::test]
async fn good_to_go_without_failing_checks() {
    let response = server(MockPublisher::new()).get("/__gtg").await;

    assert_eq!(StatusCode::OK, response.status_code());
    assert_eq!("OK", response.text());
}

#[tokio::test]
async fn not_good_to_go_when_a_dependency_is_down() {
    let server = server_with(MockPublisher::new(), vec![unreachable_check()]);

    let response = server.get("/__gtg").await;

    assert_eq!(StatusCode::SERVICE_UNAVAILABLE, response.status_code());
}

#[tokio::test]
async fn health_reports_every_check() {
    let server = server_with(MockPublisher::new(), vec![unreachable_check()]);

    let response = server.get("/__health").await;

    assert_eq!(StatusCode::OK, response.status_code());
    let report: HealthResponse = response.json();
    assert_eq!(SERVICE_NAME, report.name);
    assert!(!report.ok);
    assert_eq!(1, report.checks.len());
    assert_eq!("Check connectivity to document-store-api", report.checks[0].name);
    assert!(!report.checks[0].ok);

    let raw: serde_json::Value = response.json();
    assert!(raw["checks"][0].get("businessImpact").is_some());
}

#[tokio::test]
async fn metrics_are_unavailable_when_disabled() {
    let response = server(MockPublisher::new()).get("/metrics").await;

    assert_eq!(StatusCode::SERVICE_UNAVAILABLE, response.status_code());
}

#[tokio::test]
async fn swagger_ui_is_served() {
    let response = server(MockPublisher::new()).get("/__api/openapi.json").await;

    assert_eq!(StatusCode::OK, response.status_code());
    let doc: serde_json::Value = response.json();
    assert!(doc["paths"].get("/{id}").is_some());
}
