//! Tool execution
//!
//! Validates a tool call against the registry and forwards it to the backend
//! that owns it: the calculator over HTTP, or the log search collaborator.

use std::sync::Arc;

use serde_json::{Value, json};

use super::backend::CalculatorClient;
use super::invocation::{LogSearchParams, ToolInvocation};
use super::registry::ToolRegistry;
use crate::error::{GatewayError, Result};
use crate::logs::{LogEventPage, LogQuery, LogSearch};

/// Result of a dispatched tool call
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    /// Tool id that produced `result`
    pub tool_id: String,
    /// Backend response, unmodified
    pub result: Value,
}

/// Dispatches validated tool calls to their backends
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    calculator: CalculatorClient,
    logs: Arc<dyn LogSearch>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, calculator: CalculatorClient, logs: Arc<dyn LogSearch>) -> Self {
        Self {
            registry,
            calculator,
            logs,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Validate untyped `parameters` for `tool_id` and run the tool
    pub async fn execute(&self, tool_id: &str, parameters: &Value) -> Result<ExecutionOutcome> {
        log::info!("Executing tool: {} with params: {}", tool_id, parameters);

        let descriptor = self
            .registry
            .get(tool_id)
            .ok_or_else(|| GatewayError::ToolNotFound(tool_id.to_string()))?;
        descriptor.validate(parameters)?;

        let invocation = ToolInvocation::decode(tool_id, parameters)?;
        self.dispatch(&invocation).await
    }

    /// Run an already typed invocation.
    ///
    /// Divide-by-zero is rejected here, before any network call.
    pub async fn dispatch(&self, invocation: &ToolInvocation) -> Result<ExecutionOutcome> {
        invocation.precheck()?;

        let result = match invocation {
            ToolInvocation::ScanLogs(params) => {
                let page = self.logs.filter_events(&log_query(params, &params.log_group_name)).await?;
                page_to_json(&page)
            }
            other => match other.arithmetic() {
                Some((op, pair)) => self.calculator.calculate(op, pair).await?,
                None => return Err(GatewayError::ToolNotFound(other.tool_id().to_string())),
            },
        };

        Ok(ExecutionOutcome {
            tool_id: invocation.tool_id().to_string(),
            result,
        })
    }

    pub fn logs(&self) -> &Arc<dyn LogSearch> {
        &self.logs
    }
}

/// Filter request for `params` against a (possibly qualified) group name
pub fn log_query(params: &LogSearchParams, log_group_name: &str) -> LogQuery {
    LogQuery {
        log_group_name: log_group_name.to_string(),
        filter_pattern: params.search_string.clone(),
        start_time: params.start_time,
        end_time: params.end_time,
    }
}

/// `{events, nextToken}` body of a filter result
pub fn page_to_json(page: &LogEventPage) -> Value {
    json!({
        "events": page.events,
        "nextToken": page.next_token,
    })
}
