//! The LlmClient trait and a scripted mock

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{GatewayError, Result};
use crate::llm::types::{CompletionRequest, CompletionResponse};

/// Stateless LLM client - each call is independent (fresh context)
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single completion request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Model used when the request does not name one
    fn model(&self) -> &str;

    /// Whether the client has what it needs to make calls
    fn is_ready(&self) -> bool;
}

/// LLM client that replays scripted replies in order
#[derive(Debug, Default)]
pub struct MockLlmClient {
    replies: Mutex<VecDeque<Result<CompletionResponse>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text reply
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(CompletionResponse::text(text)));
        self
    }

    /// Queue a failure
    pub fn with_error(self, error: GatewayError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, reply: Result<CompletionResponse>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or_else(|| Err(GatewayError::upstream("mock has no scripted reply")))
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_in_order() {
        let mock = MockLlmClient::new().with_reply("first").with_reply("second");

        let a = mock.complete(CompletionRequest::new("sys")).await.unwrap();
        let b = mock.complete(CompletionRequest::new("sys")).await.unwrap();
        assert_eq!(a.content, "first");
        assert_eq!(b.content, "second");
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_exhausted_is_error() {
        let mock = MockLlmClient::new();
        let result = mock.complete(CompletionRequest::new("sys")).await;
        assert!(matches!(result, Err(GatewayError::Upstream { .. })));
    }

    #[tokio::test]
    async fn test_mock_scripted_error() {
        let mock = MockLlmClient::new().with_error(GatewayError::upstream("boom"));
        let err = mock.complete(CompletionRequest::new("sys")).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_mock_identity() {
        let mock = MockLlmClient::new();
        assert!(mock.is_ready());
        assert_eq!(mock.model(), "mock-model");
    }
}
