//! Handler tests for the HTTP surface. Handlers are called directly with
//! extracted state and body.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use skill_tree::{LlmClient, MockLlm, MockOracle, TopicOracle};
use skill_tree_gen::server::{generate_handler, health_handler, MAX_REQUEST_DEPTH};
use skill_tree_gen::{router, GenerateRequest, Pipeline, PipelineOptions};

fn pipeline(oracle: MockOracle) -> Arc<Pipeline> {
    let llm: Arc<dyn LlmClient> = Arc::new(MockLlm::with_fixed_response("Big O Notation"));
    let oracle: Arc<dyn TopicOracle> = Arc::new(oracle);
    Arc::new(Pipeline::with_oracle(llm, oracle, PipelineOptions::default()))
}

fn request(prompt: &str, max_depth: Option<u32>) -> Json<GenerateRequest> {
    Json(GenerateRequest {
        prompt: prompt.to_string(),
        max_depth,
    })
}

#[tokio::test]
async fn health_is_ok() {
    assert_eq!(health_handler().await, "OK");
}

#[tokio::test]
async fn router_builds() {
    let _ = router(pipeline(MockOracle::new()));
}

// --- generate ---

#[tokio::test]
async fn generate_returns_tree_and_graph() {
    let oracle = MockOracle::new().with("Big O Notation", ["Time Complexity Analysis"]);
    let Json(body) = generate_handler(
        State(pipeline(oracle)),
        request("Data Structures and Algorithms", None),
    )
    .await
    .unwrap();

    assert_eq!(body.root_topic, "Big O Notation");
    assert_eq!(body.skill_tree_data.topic, "Big O Notation");
    assert_eq!(body.nodes.len(), 2);
    assert_eq!(body.edges.len(), 1);

    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["nodes"][0]["id"], "1");
    assert_eq!(json["nodes"][0]["type"], "root");
    assert_eq!(json["edges"][0]["source"], "1");
    assert_eq!(json["edges"][0]["target"], "2");
}

#[tokio::test]
async fn max_depth_limits_the_response() {
    let oracle = MockOracle::new().with("Big O Notation", ["Time Complexity Analysis"]);
    let Json(body) = generate_handler(State(pipeline(oracle)), request("DSA", Some(1)))
        .await
        .unwrap();
    assert_eq!(body.nodes.len(), 1);
    assert!(body.edges.is_empty());
}

#[tokio::test]
async fn empty_prompt_is_bad_request() {
    let err = generate_handler(State(pipeline(MockOracle::new())), request("   ", None))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert!(err.message.contains("prompt"));
}

#[tokio::test]
async fn out_of_range_depth_is_bad_request() {
    for depth in [0, MAX_REQUEST_DEPTH + 1] {
        let err = generate_handler(State(pipeline(MockOracle::new())), request("DSA", Some(depth)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn pipeline_failure_is_internal_error() {
    let oracle = MockOracle::new().fail_on("Big O Notation");
    let err = generate_handler(State(pipeline(oracle)), request("DSA", None))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(err.message.contains("Big O Notation"));
}
