//! Log search collaborator
//!
//! The `scan_logs` tool reads from a log store behind the `LogSearch` trait.
//! Production uses CloudWatch Logs; tests use in-memory fakes.

mod cloudwatch;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use cloudwatch::CloudWatchLogs;

/// Prefix applied to bare function names
pub const LAMBDA_LOG_PREFIX: &str = "/aws/lambda/";

/// One filter request against a log group
#[derive(Debug, Clone, PartialEq)]
pub struct LogQuery {
    pub log_group_name: String,
    pub filter_pattern: String,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

/// A matching log event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_stream_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingestion_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

/// A page of filter results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogEventPage {
    pub events: Vec<LogEvent>,
    pub next_token: Option<String>,
}

/// Summary of a log group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogGroupSummary {
    pub name: String,
    pub creation_time: Option<i64>,
    pub retention_in_days: Option<i32>,
}

/// Read access to a log store
#[async_trait]
pub trait LogSearch: Send + Sync {
    /// Events in a group matching a filter pattern.
    ///
    /// Fails with `LogGroupNotFound` (empty `available`) if the group does not exist.
    async fn filter_events(&self, query: &LogQuery) -> Result<LogEventPage>;

    /// Log groups, optionally restricted to a name prefix
    async fn describe_log_groups(&self, prefix: Option<&str>) -> Result<Vec<LogGroupSummary>>;
}

/// Whether a requested group name means "list everything"
pub fn is_list_all(log_group_name: &str) -> bool {
    matches!(log_group_name.trim(), "/" | "*")
}

/// Qualify a bare function name with the Lambda log prefix
pub fn qualify_group_name(log_group_name: &str) -> String {
    if log_group_name.starts_with(LAMBDA_LOG_PREFIX) {
        log_group_name.to_string()
    } else {
        format!("{}{}", LAMBDA_LOG_PREFIX, log_group_name)
    }
}
