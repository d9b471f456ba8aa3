//! LLM Client Layer - Anthropic API integration and reply extraction
//!
//! This module provides:
//! - Message types for LLM communication
//! - LlmClient trait for API abstraction
//! - AnthropicClient implementation
//! - JSON extraction from free-form replies

pub mod anthropic;
pub mod client;
pub mod extract;
pub mod types;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use client::{LlmClient, MockLlmClient};
pub use extract::{Extracted, extract_json};
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, Usage};
