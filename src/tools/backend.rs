//! HTTP client for the calculator backend

use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};

use crate::calculator::{OperandPair, Operation};
use crate::error::{GatewayError, Result};

/// Forwards arithmetic tool calls to a running calculator service
#[derive(Debug, Clone)]
pub struct CalculatorClient {
    client: Client,
    base_url: String,
}

impl CalculatorClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST {base}/{op}` and return the backend body unmodified.
    ///
    /// A non-success reply becomes `Upstream` with the backend's status and
    /// body; a transport failure becomes `Internal`.
    pub async fn calculate(&self, op: Operation, pair: OperandPair) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, op);
        log::debug!("Forwarding {} to {}", op, url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "num1": pair.num1, "num2": pair.num2 }))
            .send()
            .await
            .map_err(|e| GatewayError::Internal(format!("Calculator request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Internal(format!("Failed to read calculator response: {}", e)))?;
        let body = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({ "error": text }));

        if !status.is_success() {
            return Err(GatewayError::Upstream {
                status: Some(status.as_u16()),
                message: format!("Calculator returned {}", status),
                body: Some(body),
            });
        }

        Ok(body)
    }
}
