//! Full stack: chat client -> gateway -> calculator, over real sockets

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;

use toolgate::chat::{ChatSession, GatewayClient};
use toolgate::error::Result;
use toolgate::gateway::AppState;
use toolgate::llm::MockLlmClient;
use toolgate::logs::{LogEventPage, LogGroupSummary, LogQuery, LogSearch};
use toolgate::tools::{CalculatorClient, ToolExecutor, ToolRegistry};

struct NoLogs;

#[async_trait]
impl LogSearch for NoLogs {
    async fn filter_events(&self, _query: &LogQuery) -> Result<LogEventPage> {
        Ok(LogEventPage::default())
    }

    async fn describe_log_groups(&self, _prefix: Option<&str>) -> Result<Vec<LogGroupSummary>> {
        Ok(Vec::new())
    }
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn spawn_stack(llm: MockLlmClient) -> GatewayClient {
    let calculator = spawn(toolgate::calculator::build_app()).await;

    let executor = ToolExecutor::new(
        Arc::new(ToolRegistry::builtin()),
        CalculatorClient::new(format!("http://{}", calculator), Duration::from_secs(5)).unwrap(),
        Arc::new(NoLogs),
    );
    let state = Arc::new(AppState::new(Arc::new(llm), Arc::new(executor)));
    let gateway = spawn(toolgate::gateway::build_app(state)).await;

    GatewayClient::new(format!("http://{}", gateway), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_natural_language_addition() {
    let llm = MockLlmClient::new().with_reply(
        "```json\n{\"tool\": \"add\", \"parameters\": {\"num1\": 5, \"num2\": 3}, \"explanation\": \"Adding 5 and 3\"}\n```",
    );
    let client = spawn_stack(llm).await;

    let reply = client.agent("what is 5 plus 3").await.unwrap();
    assert!(reply.is_success(), "unexpected reply {:?}", reply);
    assert_eq!(reply.body["toolUsed"], "add");
    assert_eq!(reply.body["explanation"], "Adding 5 and 3");
    assert_eq!(reply.body["result"]["operation"], "add");
    assert_eq!(reply.body["result"]["result"].as_f64(), Some(8.0));
}

#[tokio::test]
async fn test_direct_execution_through_gateway() {
    let client = spawn_stack(MockLlmClient::new()).await;

    let tools = client.list_tools().await.unwrap();
    assert_eq!(tools.len(), 6);

    let reply = client.execute("divide", &json!({"num1": 22, "num2": 7})).await.unwrap();
    assert!(reply.is_success());
    assert_eq!(reply.body["result"].as_f64(), Some(3.1428571429));
}

#[tokio::test]
async fn test_invalid_operands_rejected_before_calculator() {
    let client = spawn_stack(MockLlmClient::new()).await;

    let reply = client.execute("add", &json!({"num1": "1", "num2": 2})).await.unwrap();
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body["received"]["num1"], "string");
}

#[tokio::test]
async fn test_chat_session_local_shortcut() {
    let client = spawn_stack(MockLlmClient::new()).await;
    let session = ChatSession::new(client, true);

    let output = session.respond("What is 8 times 3?").await;
    assert!(output.contains("local shortcut"), "output was {}", output);
    assert!(output.contains("24"));
}
