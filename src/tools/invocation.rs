//! Tool invocations: the untyped decision a caller or model produces, and
//! the typed union it decodes into.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value, json};

use crate::calculator::{OperandPair, Operation};
use crate::error::{GatewayError, Result};

/// Parameters of the log search tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSearchParams {
    pub log_group_name: String,
    pub search_string: String,
    #[serde(default, deserialize_with = "epoch_millis", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, deserialize_with = "epoch_millis", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

/// Epoch milliseconds as any JSON number with no fractional part
fn epoch_millis<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(millis) = number.as_i64() {
        return Ok(Some(millis));
    }
    match number.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
        _ => Err(D::Error::custom(format!("expected whole epoch milliseconds, got {}", number))),
    }
}

/// A fully typed tool call, one variant per tool id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "parameters", rename_all = "snake_case")]
pub enum ToolInvocation {
    Add(OperandPair),
    Subtract(OperandPair),
    Multiply(OperandPair),
    Divide(OperandPair),
    Power(OperandPair),
    ScanLogs(LogSearchParams),
}

impl ToolInvocation {
    /// Decode `parameters` for `tool_id` into the typed union
    pub fn decode(tool_id: &str, parameters: &Value) -> Result<Self> {
        let tree = json!({ "tool": tool_id, "parameters": parameters });
        serde_json::from_value(tree).map_err(|e| {
            GatewayError::invalid(format!("Invalid parameters for tool '{}': {}", tool_id, e))
        })
    }

    pub fn tool_id(&self) -> &'static str {
        match self {
            Self::ScanLogs(_) => super::registry::SCAN_LOGS,
            other => other.arithmetic().map(|(op, _)| op.as_str()).unwrap_or_default(),
        }
    }

    /// Operation and operands for arithmetic tools
    pub fn arithmetic(&self) -> Option<(Operation, OperandPair)> {
        match self {
            Self::Add(p) => Some((Operation::Add, *p)),
            Self::Subtract(p) => Some((Operation::Subtract, *p)),
            Self::Multiply(p) => Some((Operation::Multiply, *p)),
            Self::Divide(p) => Some((Operation::Divide, *p)),
            Self::Power(p) => Some((Operation::Power, *p)),
            Self::ScanLogs(_) => None,
        }
    }

    /// Reject parameters the backend would refuse anyway
    pub fn precheck(&self) -> Result<()> {
        match self {
            Self::Divide(pair) if pair.is_zero_divisor() => Err(GatewayError::DivisionByZero),
            _ => Ok(()),
        }
    }
}

/// A model decision that has passed structural checks but not typing
#[derive(Debug, Clone, PartialEq)]
pub struct RawInvocation {
    pub tool: String,
    pub parameters: Value,
    pub explanation: String,
}

impl RawInvocation {
    /// Require non-empty `tool`, object `parameters` and non-empty `explanation`
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| GatewayError::InvalidResponseStructure("expected a JSON object".to_string()))?;

        let tool = non_empty_str(object, "tool")?;
        let explanation = non_empty_str(object, "explanation")?;
        let parameters = match object.get("parameters") {
            Some(params @ Value::Object(_)) => params.clone(),
            _ => {
                return Err(GatewayError::InvalidResponseStructure(
                    "missing or non-object 'parameters'".to_string(),
                ));
            }
        };

        Ok(Self {
            tool,
            parameters,
            explanation,
        })
    }
}

fn non_empty_str(object: &Map<String, Value>, key: &str) -> Result<String> {
    match object.get(key).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err(GatewayError::InvalidResponseStructure(format!(
            "missing or empty '{}'",
            key
        ))),
    }
}
