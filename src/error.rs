//! Error types for toolgate
//!
//! Centralized error handling using thiserror. Every variant renders as a
//! JSON body when returned from an axum handler.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use thiserror::Error;

/// All error types that can occur in toolgate
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Caller supplied malformed input
    #[error("{message}")]
    InvalidArgument {
        message: String,
        /// Observed `typeof` tags for the offending fields, when known
        received: Option<Value>,
    },

    /// Tool id is not in the registry
    #[error("Tool '{0}' not found")]
    ToolNotFound(String),

    /// Calculator route for an unknown operation
    #[error("Operation '{0}' not found")]
    OperationNotFound(String),

    #[error("Division by zero is not allowed")]
    DivisionByZero,

    /// Language model or backend failure
    #[error("Upstream error: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
        /// Backend body, forwarded verbatim when present
        body: Option<Value>,
    },

    /// Model output parsed but lacked the expected fields
    #[error("Invalid response structure: {0}")]
    InvalidResponseStructure(String),

    #[error("Log group '{group}' not found.")]
    LogGroupNotFound { group: String, available: Vec<String> },

    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for toolgate operations
pub type Result<T> = std::result::Result<T, GatewayError>;

impl GatewayError {
    /// Shorthand for an `InvalidArgument` without type information
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
            received: None,
        }
    }

    /// Upstream failure with no status or body (transport, SDK, etc.)
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            status: None,
            message: message.into(),
            body: None,
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument { .. } | Self::DivisionByZero => StatusCode::BAD_REQUEST,
            Self::ToolNotFound(_) | Self::OperationNotFound(_) | Self::LogGroupNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            Self::Upstream { status: Some(code), .. } => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is a caller mistake rather than a server-side failure
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. }
                | Self::DivisionByZero
                | Self::ToolNotFound(_)
                | Self::OperationNotFound(_)
                | Self::LogGroupNotFound { .. }
        )
    }

    /// Whether repeating the same call could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Upstream { status: None, .. } => true,
            Self::Upstream { status: Some(code), .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }

    /// JSON body describing this error
    pub fn to_body(&self) -> Value {
        match self {
            Self::InvalidArgument {
                message,
                received: Some(received),
            } => json!({ "error": message, "received": received }),
            Self::Upstream { body: Some(body), .. } => body.clone(),
            Self::LogGroupNotFound { available, .. } => json!({
                "error": self.to_string(),
                "availableLogGroups": available,
                "message": "Please use one of the available log groups listed above.",
            }),
            Self::Internal(_) => json!({ "error": "Internal server error" }),
            _ => json!({ "error": self.to_string() }),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}
