//! Interactive chat client for the gateway

mod client;
mod session;
mod shortcut;

pub use client::{GatewayClient, GatewayReply, ToolSummary};
pub use session::{ChatCommand, ChatSession, HELP_TEXT};
pub use shortcut::{Shortcut, detect as detect_shortcut};
