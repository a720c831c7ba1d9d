//! HTTP surface: `GET /health` and `POST /generate-skill-tree`.
//!
//! **Interaction**: `main serve` builds one `Pipeline` and passes it to
//! `run_server`; handlers share it through axum state.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use skill_tree::{GraphEdge, GraphNode, NodeResult, Topic};

use crate::pipeline::Pipeline;

/// Requests asking for a deeper tree than this are rejected.
pub const MAX_REQUEST_DEPTH: u32 = 6;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub max_depth: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub root_topic: Topic,
    pub skill_tree_data: NodeResult,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Error reply: `{"error": "..."}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/generate-skill-tree", post(generate_handler))
        .with_state(pipeline)
}

pub async fn run_server(port: u16, pipeline: Arc<Pipeline>) -> anyhow::Result<()> {
    let app = router(pipeline);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub async fn health_handler() -> &'static str {
    "OK"
}

pub async fn generate_handler(
    State(pipeline): State<Arc<Pipeline>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let subject = request.prompt.trim();
    if subject.is_empty() {
        return Err(ApiError::bad_request("prompt is required"));
    }
    if let Some(depth) = request.max_depth {
        if depth == 0 || depth > MAX_REQUEST_DEPTH {
            return Err(ApiError::bad_request(format!(
                "max_depth must be between 1 and {MAX_REQUEST_DEPTH}"
            )));
        }
    }

    let output = pipeline
        .run_with_depth(subject, request.max_depth)
        .await
        .map_err(|e| {
            error!(subject, error = %e, "skill tree generation failed");
            ApiError::internal(e.to_string())
        })?;

    Ok(Json(GenerateResponse {
        root_topic: output.root_topic,
        skill_tree_data: output.tree,
        nodes: output.graph.nodes,
        edges: output.graph.edges,
    }))
}
