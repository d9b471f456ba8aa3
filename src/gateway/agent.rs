//! Natural-language router
//!
//! Turns a free-text request into exactly one tool call: ask the model which
//! tool to use, pull its JSON decision out of the reply, check it against the
//! registry, and dispatch it.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{GatewayError, Result};
use crate::llm::{CompletionRequest, Extracted, LlmClient, extract_json};
use crate::logs::{LogSearch, is_list_all, qualify_group_name};
use crate::tools::{LogSearchParams, RawInvocation, ToolExecutor, ToolInvocation, ToolRegistry, log_query, page_to_json};

/// Tool id reported when the log store is listed instead of searched
pub const LIST_LOG_GROUPS: &str = "list_log_groups";

const PARAMETER_CONVENTIONS: &str = "\
When a user asks for a calculation:
- Determine the correct tool to use.
- Extract the necessary parameters following the exact names:
  - For subtraction: **num1** is the number being subtracted from, **num2** is the number being subtracted.
  - For division: **num1** is the dividend (number being divided), **num2** is the divisor (number to divide by).
  - For power: **num1** is the base, **num2** is the exponent.
  - For CloudWatch logs: **logGroupName** is the name of the log group, **searchString** is the pattern to search for.

For complex expressions, break them into steps by adhering to the BODMAS rules:
1. **Brackets**
2. **Orders (Powers)**
3. **Division**
4. **Multiplication**
5. **Addition**
6. **Subtraction**";

/// Successful `/agent` reply
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub explanation: String,
    pub result: Value,
    pub tool_used: String,
}

/// What the router made of a message
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    Completed(AgentResponse),
    /// The model reply could not be turned into a tool call
    Unparseable { raw: String, reason: String },
}

pub struct AgentRouter {
    llm: Arc<dyn LlmClient>,
    executor: Arc<ToolExecutor>,
    system_prompt: String,
}

impl AgentRouter {
    pub fn new(llm: Arc<dyn LlmClient>, executor: Arc<ToolExecutor>) -> Self {
        let system_prompt = build_system_prompt(executor.registry());
        Self {
            llm,
            executor,
            system_prompt,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn registry(&self) -> &ToolRegistry {
        self.executor.registry()
    }

    fn logs(&self) -> &Arc<dyn LogSearch> {
        self.executor.logs()
    }

    /// Route one user message to a tool and return its result
    pub async fn handle(&self, message: &str) -> Result<AgentOutcome> {
        if message.trim().is_empty() {
            return Err(GatewayError::invalid("Message is required"));
        }
        log::info!("Routing message: {}", message);

        let request = CompletionRequest::new(self.system_prompt.as_str()).with_user_message(message);
        let reply = self.llm.complete(request).await?;
        log::debug!("Model reply: {}", reply.content);

        let value = match extract_json(&reply.content) {
            Extracted::Parsed(value) => value,
            Extracted::Unparseable { raw, reason } => {
                log::warn!("Could not parse model reply: {}", reason);
                return Ok(AgentOutcome::Unparseable { raw, reason });
            }
        };

        let raw = RawInvocation::from_value(&value)?;
        let descriptor = self
            .registry()
            .get(&raw.tool)
            .ok_or_else(|| GatewayError::ToolNotFound(raw.tool.clone()))?;

        let typed = descriptor
            .validate(&raw.parameters)
            .and_then(|_| ToolInvocation::decode(&raw.tool, &raw.parameters));
        let invocation = match typed {
            Ok(invocation) => invocation,
            Err(e) => {
                log::warn!("Model chose {} with bad parameters: {}", raw.tool, e);
                return Ok(AgentOutcome::Unparseable {
                    raw: reply.content,
                    reason: e.to_string(),
                });
            }
        };
        invocation.precheck()?;

        let response = match &invocation {
            ToolInvocation::ScanLogs(params) => self.scan_logs(params, raw.explanation).await?,
            other => {
                let outcome = self.executor.dispatch(other).await?;
                AgentResponse {
                    explanation: raw.explanation,
                    result: outcome.result,
                    tool_used: outcome.tool_id,
                }
            }
        };

        log::info!("Completed with tool {}", response.tool_used);
        Ok(AgentOutcome::Completed(response))
    }

    /// Log search with group listing, name qualification and existence checks
    async fn scan_logs(&self, params: &LogSearchParams, explanation: String) -> Result<AgentResponse> {
        if is_list_all(&params.log_group_name) {
            let groups = self.logs().describe_log_groups(None).await?;
            return Ok(AgentResponse {
                explanation: "Listing all available AWS CloudWatch log groups".to_string(),
                result: json!({ "logGroups": groups }),
                tool_used: LIST_LOG_GROUPS.to_string(),
            });
        }

        let group = qualify_group_name(&params.log_group_name);
        let matching = self.logs().describe_log_groups(Some(&group)).await?;
        if matching.is_empty() {
            return Err(self.group_not_found(group).await);
        }

        let page = match self.logs().filter_events(&log_query(params, &group)).await {
            Ok(page) => page,
            Err(GatewayError::LogGroupNotFound { .. }) => return Err(self.group_not_found(group).await),
            Err(e) => return Err(e),
        };

        let mut result = page_to_json(&page);
        result["logGroupName"] = json!(group);
        Ok(AgentResponse {
            explanation,
            result,
            tool_used: crate::tools::SCAN_LOGS.to_string(),
        })
    }

    async fn group_not_found(&self, group: String) -> GatewayError {
        log::warn!("Log group {} not found", group);
        match self.logs().describe_log_groups(None).await {
            Ok(groups) => GatewayError::LogGroupNotFound {
                group,
                available: groups.into_iter().map(|g| g.name).collect(),
            },
            Err(e) => e,
        }
    }
}

/// System instruction naming every registered tool and the reply contract
pub fn build_system_prompt(registry: &ToolRegistry) -> String {
    let tools = registry
        .list()
        .iter()
        .enumerate()
        .map(|(i, tool)| format!("{}. **{} ({})**: {}", i + 1, tool.name, tool.id, tool.description))
        .collect::<Vec<_>>()
        .join("\n");

    let ids = registry
        .ids()
        .iter()
        .map(|id| format!("\"{}\"", id))
        .collect::<Vec<_>>()
        .join(" | ");

    format!(
        "You are an AI assistant that helps users perform calculations and other tasks by selecting the \
         appropriate tool for the job. You have access to the following tools:\n\n{}\n\n{}\n\n\
         ### Response Format\n\
         Always respond in JSON format with the following structure:\n\n\
         {{\n  \"tool\": {},\n  \"parameters\": {{\n    \"num1\": number,\n    \"num2\": number\n  }} | {{\n    \
         \"logGroupName\": string,\n    \"searchString\": string,\n    \"startTime\"?: number,\n    \
         \"endTime\"?: number\n  }},\n  \"explanation\": \"Brief explanation of what you're doing\"\n}}",
        tools, PARAMETER_CONVENTIONS, ids
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::logs::{LogEvent, LogEventPage, LogGroupSummary, LogQuery};
    use crate::tools::CalculatorClient;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// In-memory log store with a fixed set of groups
    #[derive(Default)]
    struct FakeLogs {
        groups: Vec<String>,
        queries: Mutex<Vec<LogQuery>>,
    }

    impl FakeLogs {
        fn with_groups(groups: &[&str]) -> Self {
            Self {
                groups: groups.iter().map(|g| g.to_string()).collect(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl LogSearch for FakeLogs {
        async fn filter_events(&self, query: &LogQuery) -> Result<LogEventPage> {
            self.queries.lock().unwrap().push(query.clone());
            Ok(LogEventPage {
                events: vec![LogEvent {
                    message: Some(format!("{} seen", query.filter_pattern)),
                    ..Default::default()
                }],
                next_token: None,
            })
        }

        async fn describe_log_groups(&self, prefix: Option<&str>) -> Result<Vec<LogGroupSummary>> {
            Ok(self
                .groups
                .iter()
                .filter(|g| prefix.is_none_or(|p| g.starts_with(p)))
                .map(|g| LogGroupSummary {
                    name: g.clone(),
                    creation_time: Some(1),
                    retention_in_days: None,
                })
                .collect())
        }
    }

    fn router(llm: MockLlmClient, calculator_url: &str, logs: Arc<FakeLogs>) -> AgentRouter {
        let executor = ToolExecutor::new(
            Arc::new(ToolRegistry::builtin()),
            CalculatorClient::new(calculator_url, Duration::from_secs(5)).unwrap(),
            logs,
        );
        AgentRouter::new(Arc::new(llm), Arc::new(executor))
    }

    fn decision(tool: &str, parameters: Value) -> String {
        format!(
            "```json\n{}\n```",
            json!({"tool": tool, "parameters": parameters, "explanation": "Doing it"})
        )
    }

    fn completed(outcome: AgentOutcome) -> AgentResponse {
        match outcome {
            AgentOutcome::Completed(response) => response,
            other => panic!("Expected Completed, got {:?}", other),
        }
    }

    async fn silent_calculator() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_system_prompt_lists_every_tool() {
        let prompt = build_system_prompt(&ToolRegistry::builtin());
        for id in ["add", "subtract", "multiply", "divide", "power", "scan_logs"] {
            assert!(prompt.contains(&format!("({})", id)), "missing {}", id);
        }
        assert!(prompt.contains("BODMAS"));
        assert!(prompt.contains("\"explanation\""));
        assert!(prompt.contains("**num1** is the base"));
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let router = router(MockLlmClient::new(), "http://127.0.0.1:9", Arc::default());
        let err = router.handle("   ").await.unwrap_err();
        assert_eq!(err.to_string(), "Message is required");
    }

    #[tokio::test]
    async fn test_routes_addition_to_calculator() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/add"))
            .and(body_json(json!({"num1": 5.0, "num2": 3.0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "operation": "add", "num1": 5, "num2": 3, "result": 8
            })))
            .expect(1)
            .mount(&server)
            .await;

        let llm = MockLlmClient::new().with_reply(decision("add", json!({"num1": 5, "num2": 3})));
        let response = completed(router(llm, &server.uri(), Arc::default()).handle("what is 5 plus 3").await.unwrap());

        assert_eq!(response.tool_used, "add");
        assert_eq!(response.explanation, "Doing it");
        assert_eq!(response.result["result"], 8);
    }

    #[tokio::test]
    async fn test_message_sent_verbatim_with_system_prompt() {
        let llm = Arc::new(MockLlmClient::new().with_reply("no json here"));
        let executor = ToolExecutor::new(
            Arc::new(ToolRegistry::builtin()),
            CalculatorClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap(),
            Arc::new(FakeLogs::default()),
        );
        let router = AgentRouter::new(llm.clone(), Arc::new(executor));
        router.handle("  what is 2^8?  ").await.unwrap();

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system, router.system_prompt());
        assert_eq!(requests[0].messages[0].content, "  what is 2^8?  ");
    }

    #[tokio::test]
    async fn test_only_first_fenced_block_dispatched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/add"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 8})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/subtract"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 5})))
            .expect(0)
            .mount(&server)
            .await;

        let reply = format!(
            "Step 1:\n\n{}\n\nStep 2:\n\n{}",
            decision("add", json!({"num1": 4, "num2": 4})),
            decision("subtract", json!({"num1": 8, "num2": 3}))
        );
        let llm = MockLlmClient::new().with_reply(reply);
        let response = completed(router(llm, &server.uri(), Arc::default()).handle("4 + 4 - 3").await.unwrap());
        assert_eq!(response.tool_used, "add");
    }

    #[tokio::test]
    async fn test_prose_reply_is_unparseable() {
        let server = silent_calculator().await;
        let llm = MockLlmClient::new().with_reply("I'm not sure what you mean.");
        let outcome = router(llm, &server.uri(), Arc::default()).handle("hello").await.unwrap();
        match outcome {
            AgentOutcome::Unparseable { raw, .. } => assert_eq!(raw, "I'm not sure what you mean."),
            other => panic!("Expected Unparseable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_explanation_is_structure_error() {
        let llm = MockLlmClient::new().with_reply(r#"{"tool": "add", "parameters": {"num1": 1, "num2": 2}}"#);
        let err = router(llm, "http://127.0.0.1:9", Arc::default())
            .handle("1 + 2")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponseStructure(_)));
    }

    #[tokio::test]
    async fn test_unknown_tool_from_model() {
        let llm = MockLlmClient::new().with_reply(decision("sqrt", json!({"num1": 9})));
        let err = router(llm, "http://127.0.0.1:9", Arc::default())
            .handle("square root of 9")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ToolNotFound(ref id) if id == "sqrt"));
    }

    #[tokio::test]
    async fn test_string_operands_are_unparseable_without_dispatch() {
        let server = silent_calculator().await;
        let llm = MockLlmClient::new().with_reply(decision("add", json!({"num1": "5", "num2": 3})));
        let outcome = router(llm, &server.uri(), Arc::default()).handle("5 + 3").await.unwrap();
        match outcome {
            AgentOutcome::Unparseable { reason, .. } => assert!(reason.contains("add")),
            other => panic!("Expected Unparseable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_divide_by_zero_makes_no_calculator_call() {
        let server = silent_calculator().await;
        let llm = MockLlmClient::new().with_reply(decision("divide", json!({"num1": 7, "num2": 0})));
        let err = router(llm, &server.uri(), Arc::default()).handle("7 / 0").await.unwrap_err();
        assert!(matches!(err, GatewayError::DivisionByZero));
    }

    #[tokio::test]
    async fn test_model_failure_is_upstream() {
        let llm = MockLlmClient::new().with_error(GatewayError::Upstream {
            status: Some(529),
            message: "overloaded".into(),
            body: None,
        });
        let err = router(llm, "http://127.0.0.1:9", Arc::default()).handle("1 + 1").await.unwrap_err();
        assert!(matches!(err, GatewayError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_scan_logs_qualifies_group_name() {
        let logs = Arc::new(FakeLogs::with_groups(&["/aws/lambda/orders", "/aws/lambda/users"]));
        let llm = MockLlmClient::new()
            .with_reply(decision("scan_logs", json!({"logGroupName": "orders", "searchString": "ERROR"})));
        let response = completed(
            router(llm, "http://127.0.0.1:9", logs.clone())
                .handle("find errors in orders")
                .await
                .unwrap(),
        );

        assert_eq!(response.tool_used, "scan_logs");
        assert_eq!(response.result["logGroupName"], "/aws/lambda/orders");
        assert_eq!(response.result["events"][0]["message"], "ERROR seen");
        assert_eq!(logs.queries.lock().unwrap()[0].log_group_name, "/aws/lambda/orders");
    }

    #[tokio::test]
    async fn test_scan_logs_star_lists_groups() {
        let logs = Arc::new(FakeLogs::with_groups(&["/aws/lambda/orders", "/ecs/web"]));
        let llm =
            MockLlmClient::new().with_reply(decision("scan_logs", json!({"logGroupName": "*", "searchString": ""})));
        let response = completed(router(llm, "http://127.0.0.1:9", logs.clone()).handle("list log groups").await.unwrap());

        assert_eq!(response.tool_used, LIST_LOG_GROUPS);
        let groups = response.result["logGroups"].as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1]["name"], "/ecs/web");
        assert!(logs.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_logs_missing_group_lists_available() {
        let logs = Arc::new(FakeLogs::with_groups(&["/aws/lambda/orders"]));
        let llm = MockLlmClient::new()
            .with_reply(decision("scan_logs", json!({"logGroupName": "payments", "searchString": "ERROR"})));
        let err = router(llm, "http://127.0.0.1:9", logs.clone())
            .handle("errors in payments")
            .await
            .unwrap_err();

        match err {
            GatewayError::LogGroupNotFound { group, available } => {
                assert_eq!(group, "/aws/lambda/payments");
                assert_eq!(available, vec!["/aws/lambda/orders".to_string()]);
            }
            other => panic!("Expected LogGroupNotFound, got {:?}", other),
        }
        assert!(logs.queries.lock().unwrap().is_empty());
    }
}
