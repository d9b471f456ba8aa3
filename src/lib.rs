//! Toolgate - a calculator service, an LLM tool gateway and a chat client
//!
//! The gateway exposes a fixed registry of tools (arithmetic backed by the
//! calculator service, log search backed by CloudWatch Logs) for direct
//! execution, and routes free-text requests to a tool by asking a language
//! model which one to use.

pub mod calculator;
pub mod chat;
pub mod error;
pub mod gateway;
pub mod llm;
pub mod logs;
pub mod tools;

pub use error::{GatewayError, Result};
