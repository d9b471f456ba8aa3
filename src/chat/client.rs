//! HTTP client for a running gateway

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{GatewayError, Result};

/// Tool entry as listed by `GET /tools`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolSummary {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Status and JSON body of a gateway reply
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply {
    pub status: u16,
    pub body: Value,
}

impl GatewayReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The gateway's `error` field, or the whole body when there is none
    pub fn error_message(&self) -> String {
        match self.body.get("error") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => self.body.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
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

    pub async fn list_tools(&self) -> Result<Vec<ToolSummary>> {
        let url = format!("{}/tools", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::upstream(format!("Failed to reach gateway at {}: {}", self.base_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Upstream {
                status: Some(status.as_u16()),
                message: format!("Gateway returned {} for /tools", status),
                body: None,
            });
        }

        response
            .json()
            .await
            .map_err(|e| GatewayError::upstream(format!("Invalid tool list: {}", e)))
    }

    /// `POST /agent {message}`
    pub async fn agent(&self, message: &str) -> Result<GatewayReply> {
        self.post("agent", &json!({ "message": message })).await
    }

    /// `POST /execute/{tool_id}` with `parameters` as the body
    pub async fn execute(&self, tool_id: &str, parameters: &Value) -> Result<GatewayReply> {
        self.post(&format!("execute/{}", tool_id), parameters).await
    }

    async fn post(&self, route: &str, body: &Value) -> Result<GatewayReply> {
        let url = format!("{}/{}", self.base_url, route);
        log::debug!("POST {} {}", url, body);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::upstream(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::upstream(format!("Failed to read gateway response: {}", e)))?;
        let body = serde_json::from_str(&text).unwrap_or_else(|_| json!({ "error": text }));

        Ok(GatewayReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GatewayClient {
        GatewayClient::new(format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_list_tools() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tools"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "add", "name": "addition", "description": "Adds two numbers together", "parameters": {}}
            ])))
            .mount(&server)
            .await;

        let tools = client_for(&server).list_tools().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].id, "add");
    }

    #[tokio::test]
    async fn test_list_tools_unreachable() {
        let client = GatewayClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert!(client.list_tools().await.is_err());
    }

    #[tokio::test]
    async fn test_agent_keeps_error_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/agent"))
            .and(body_json(json!({"message": "hi"})))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": "Failed to process message", "details": "boom"
            })))
            .mount(&server)
            .await;

        let reply = client_for(&server).agent("hi").await.unwrap();
        assert!(!reply.is_success());
        assert_eq!(reply.status, 500);
        assert_eq!(reply.error_message(), "Failed to process message");
    }

    #[tokio::test]
    async fn test_execute_posts_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/execute/multiply"))
            .and(body_json(json!({"num1": 4.0, "num2": 6.0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 24})))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .execute("multiply", &json!({"num1": 4.0, "num2": 6.0}))
            .await
            .unwrap();
        assert!(reply.is_success());
        assert_eq!(reply.body["result"], 24);
    }

    #[test]
    fn test_error_message_without_error_field() {
        let reply = GatewayReply {
            status: 502,
            body: json!({"detail": "bad gateway"}),
        };
        assert!(reply.error_message().contains("bad gateway"));
    }
}
