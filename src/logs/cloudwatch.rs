//! CloudWatch Logs implementation of `LogSearch`

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudwatchlogs::Client;
use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;

use super::{LogEvent, LogEventPage, LogGroupSummary, LogQuery, LogSearch};
use crate::error::{GatewayError, Result};

/// Upper bound on DescribeLogGroups pages fetched per call
const MAX_DESCRIBE_PAGES: usize = 10;

/// Log search backed by AWS CloudWatch Logs
#[derive(Debug, Clone)]
pub struct CloudWatchLogs {
    client: Client,
    region: String,
}

impl CloudWatchLogs {
    /// Build a client from the default AWS credential chain
    pub async fn connect(region: impl Into<String>) -> Self {
        let region = region.into();
        log::info!("Initializing CloudWatch Logs client in region: {}", region);

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .load()
            .await;

        Self {
            client: Client::new(&aws_config),
            region,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl LogSearch for CloudWatchLogs {
    async fn filter_events(&self, query: &LogQuery) -> Result<LogEventPage> {
        let pattern = Some(query.filter_pattern.clone()).filter(|p| !p.is_empty());

        let output = self
            .client
            .filter_log_events()
            .log_group_name(&query.log_group_name)
            .set_filter_pattern(pattern)
            .set_start_time(query.start_time)
            .set_end_time(query.end_time)
            .send()
            .await
            .map_err(|err| {
                let missing = err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception());
                if missing {
                    GatewayError::LogGroupNotFound {
                        group: query.log_group_name.clone(),
                        available: Vec::new(),
                    }
                } else {
                    GatewayError::upstream(format!("FilterLogEvents failed: {}", DisplayErrorContext(&err)))
                }
            })?;

        let events = output
            .events()
            .iter()
            .map(|e| LogEvent {
                log_stream_name: e.log_stream_name().map(String::from),
                timestamp: e.timestamp(),
                message: e.message().map(String::from),
                ingestion_time: e.ingestion_time(),
                event_id: e.event_id().map(String::from),
            })
            .collect();

        Ok(LogEventPage {
            events,
            next_token: output.next_token().map(String::from),
        })
    }

    async fn describe_log_groups(&self, prefix: Option<&str>) -> Result<Vec<LogGroupSummary>> {
        let mut groups = Vec::new();
        let mut next_token: Option<String> = None;

        for _ in 0..MAX_DESCRIBE_PAGES {
            let output = self
                .client
                .describe_log_groups()
                .set_log_group_name_prefix(prefix.map(String::from))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|err| {
                    GatewayError::upstream(format!("DescribeLogGroups failed: {}", DisplayErrorContext(&err)))
                })?;

            groups.extend(output.log_groups().iter().filter_map(|g| {
                g.log_group_name().map(|name| LogGroupSummary {
                    name: name.to_string(),
                    creation_time: g.creation_time(),
                    retention_in_days: g.retention_in_days(),
                })
            }));

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(groups)
    }
}
