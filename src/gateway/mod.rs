//! Tool gateway: discovery, direct execution and the natural-language router

mod agent;
mod server;

pub use agent::{AgentOutcome, AgentResponse, AgentRouter, LIST_LOG_GROUPS, build_system_prompt};
pub use server::{AppState, build_app};
