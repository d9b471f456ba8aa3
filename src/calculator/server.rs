//! HTTP surface of the calculator

use axum::extract::Path;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use super::ops::{Calculation, OperandPair, Operation};
use crate::error::{GatewayError, Result};

/// Build the calculator router
pub fn build_app() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/{operation}", post(calculate))
        .layer(CorsLayer::permissive())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn calculate(
    Path(operation): Path<String>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Calculation>> {
    let op = Operation::parse(&operation).ok_or_else(|| GatewayError::OperationNotFound(operation.clone()))?;

    // An unreadable body is treated like one without operands.
    let body = body.map(|Json(value)| value).unwrap_or(Value::Null);
    let pair = OperandPair::from_json(&body)?;

    Calculation::compute(op, pair).map(Json).inspect_err(|e| {
        log::warn!("Error in {} endpoint: {}", op, e);
    })
}
