use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use combiner_clients::{ContentClient, InternalContentClient, OpaClient, UrlTemplate};
use combiner_core::result::{FetchError, PolicyError};
use combiner_core::{ContentFetcher, InternalContentFetcher, PolicyEvaluator};
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

mod common;

const UUID: &str = "0cef259d-030d-497d-b4ef-e8fa0ee6db6b";

async fn content_handler(Path(uuid): Path<String>) -> impl IntoResponse {
    match uuid.as_str() {
        UUID => (
            StatusCode::OK,
            json!({ "uuid": UUID, "type": "Article", "title": "simple title" }).to_string(),
        ),
        "broken" => (StatusCode::OK, "{not json".to_string()),
        "failing" => (StatusCode::SERVICE_UNAVAILABLE, String::new()),
        _ => (StatusCode::NOT_FOUND, String::new()),
    }
}

async fn internal_content_handler(Path(uuid): Path<String>) -> impl IntoResponse {
    if uuid != UUID {
        return (StatusCode::NOT_FOUND, String::new());
    }
    (
        StatusCode::OK,
        json!({
            "uuid": UUID,
            "bodyXML": "<body>text</body>",
            "annotations": [{
                "id": "http://api.ft.com/things/2384fa7a-d514-3d6a-a0ea-3a711f66d0d8",
                "prefLabel": "Apple",
                "types": ["http://www.ft.com/ontology/organisation/Organisation"],
                "predicate": "http://www.ft.com/ontology/annotation/mentions",
            }],
        })
        .to_string(),
    )
}

async fn content_client() -> ContentClient {
    let base = common::serve(Router::new().route("/content/{uuid}", get(content_handler))).await;
    ContentClient::new(reqwest::Client::new(), UrlTemplate::new(base, "/content/{uuid}"))
}

#[tokio::test]
async fn content_is_read_from_the_store() {
    let client = content_client().await;

    let content = client.content(UUID).await.unwrap().unwrap();

    assert_eq!(UUID, content.uuid());
    assert_eq!("Article", content.content_type());
}

#[tokio::test]
async fn missing_content_is_not_an_error() {
    let client = content_client().await;

    assert_eq!(None, client.content("unknown").await.unwrap());
}

#[rstest]
#[case::bad_status("failing")]
#[case::bad_body("broken")]
#[tokio::test]
async fn content_failures_are_errors(#[case] uuid: &str) {
    let client = content_client().await;

    let err = client.content(uuid).await.unwrap_err();

    match uuid {
        "failing" => assert!(matches!(err.current_context(), FetchError::Status(503))),
        _ => assert!(matches!(err.current_context(), FetchError::ParseContent)),
    }
}

#[tokio::test]
async fn internal_content_splits_annotations() {
    let base = common::serve(
        Router::new().route("/internalcontent/{uuid}", get(internal_content_handler)),
    )
    .await;
    let client = InternalContentClient::new(
        reqwest::Client::new(),
        UrlTemplate::new(base, "/internalcontent/{uuid}"),
    );

    let internal = client.internal_content(UUID).await.unwrap().unwrap();

    assert!(internal.content.get("annotations").is_none());
    assert_eq!(
        Some("<body>text</body>"),
        internal.content.get("bodyXML").and_then(Value::as_str)
    );
    let annotations = internal.annotations.unwrap();
    assert_eq!(1, annotations.len());
    assert_eq!("Apple", annotations[0].thing.pref_label);

    assert_eq!(None, client.internal_content("unknown").await.unwrap());
}

#[derive(Clone, Default)]
struct PolicyState {
    inputs: Arc<Mutex<Vec<Value>>>,
}

async fn policy_handler(
    State(state): State<PolicyState>,
    Path(policy): Path<String>,
    Json(query): Json<Value>,
) -> impl IntoResponse {
    state.inputs.lock().unwrap().push(query["input"].clone());
    match policy.as_str() {
        "skip" => (
            StatusCode::OK,
            Json(json!({
                "decision_id": "d-1",
                "result": { "skip": true, "reasons": ["restricted content"] },
            })),
        ),
        "undefined" => (StatusCode::OK, Json(json!({ "decision_id": "d-2" }))),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))),
    }
}

async fn policy_server() -> (String, PolicyState) {
    let state = PolicyState::default();
    let base = common::serve(
        Router::new()
            .route("/v1/data/kafka/{policy}", post(policy_handler))
            .with_state(state.clone()),
    )
    .await;
    (base, state)
}

#[tokio::test]
async fn policy_decision_is_read_from_result() {
    let (base, state) = policy_server().await;
    let client = OpaClient::new(reqwest::Client::new(), &base, "kafka/skip");

    let decision = client.evaluate(json!({ "uuid": UUID })).await.unwrap();

    assert!(decision.skip);
    assert_eq!(vec!["restricted content".to_string()], decision.reasons);
    assert_eq!(vec![json!({ "uuid": UUID })], *state.inputs.lock().unwrap());
}

#[tokio::test]
async fn undefined_policy_result_does_not_skip() {
    let (base, _) = policy_server().await;
    let client = OpaClient::new(reqwest::Client::new(), &base, "kafka/undefined");

    let decision = client.evaluate(json!({})).await.unwrap();

    assert!(!decision.skip);
    assert!(decision.reasons.is_empty());
}

#[tokio::test]
async fn policy_agent_failure_is_an_error() {
    let (base, _) = policy_server().await;
    let client = OpaClient::new(reqwest::Client::new(), &base, "kafka/broken");

    let err = client.evaluate(json!({})).await.unwrap_err();

    assert!(matches!(err.current_context(), PolicyError::Status(500)));
}
