//! HTTP surface of the tool gateway

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use super::agent::{AgentOutcome, AgentRouter};
use crate::error::{GatewayError, Result};
use crate::llm::LlmClient;
use crate::tools::{ToolDescriptor, ToolExecutor};

/// Shared state for the gateway handlers
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<ToolExecutor>,
    pub agent: Arc<AgentRouter>,
}

impl AppState {
    pub fn new(llm: Arc<dyn LlmClient>, executor: Arc<ToolExecutor>) -> Self {
        let agent = Arc::new(AgentRouter::new(llm, executor.clone()));
        Self { executor, agent }
    }
}

/// Build the gateway router
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/execute/{tool_id}", post(execute_tool))
        .route("/agent", post(agent))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_tools(State(state): State<Arc<AppState>>) -> Json<Vec<ToolDescriptor>> {
    Json(state.executor.registry().list().to_vec())
}

async fn execute_tool(
    State(state): State<Arc<AppState>>,
    Path(tool_id): Path<String>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
    let params = body.map(|Json(value)| value).unwrap_or(Value::Null);
    state
        .executor
        .execute(&tool_id, &params)
        .await
        .map(|outcome| Json(outcome.result))
        .inspect_err(|e| log::error!("Error executing tool {}: {}", tool_id, e))
}

async fn agent(State(state): State<Arc<AppState>>, body: std::result::Result<Json<Value>, JsonRejection>) -> Response {
    let message = body
        .ok()
        .and_then(|Json(value)| value.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default();

    match state.agent.handle(&message).await {
        Ok(AgentOutcome::Completed(response)) => Json(response).into_response(),
        Ok(AgentOutcome::Unparseable { raw, reason }) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Failed to parse model response",
                "details": reason,
                "rawResponse": raw,
            })),
        )
            .into_response(),
        Err(e) => agent_error(e),
    }
}

/// Caller mistakes keep their own status; everything else is a processing failure
fn agent_error(error: GatewayError) -> Response {
    if error.is_client_error() {
        log::warn!("Rejected agent request: {}", error);
        return error.into_response();
    }

    log::error!("Error processing message: {}", error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Failed to process message",
            "details": error.to_string(),
        })),
    )
        .into_response()
}
