//! Line-oriented chat loop

use colored::*;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::client::{GatewayClient, GatewayReply};
use super::shortcut;
use crate::error::Result;

pub const HELP_TEXT: &str = "\
I can help you with calculations and log searches. For example:
- \"Add 5 and 3\"
- \"What is 10 plus 20?\"
- \"Calculate 7.5 + 2.25\"
- \"Multiply 4 by 6\"
- \"What is 8 times 3?\"
- \"Find ERROR in the orders log group\"

Type \"exit\" or \"quit\" to end the conversation.";

/// What a line of input asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand<'a> {
    Exit,
    Help,
    Empty,
    Message(&'a str),
}

impl<'a> ChatCommand<'a> {
    pub fn classify(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match trimmed.to_lowercase().as_str() {
            "exit" | "quit" => Self::Exit,
            "help" => Self::Help,
            _ => Self::Message(trimmed),
        }
    }
}

pub struct ChatSession {
    client: GatewayClient,
    local_shortcuts: bool,
}

impl ChatSession {
    pub fn new(client: GatewayClient, local_shortcuts: bool) -> Self {
        Self {
            client,
            local_shortcuts,
        }
    }

    /// Fetch the tool list, then read stdin until exit or EOF
    pub async fn run(&self) -> Result<()> {
        println!("{}", "Connecting to gateway...".cyan());
        let tools = self.client.list_tools().await?;

        println!("Connected with {} tools available.", tools.len());
        println!("Available tools:");
        for tool in &tools {
            println!("- {}: {}", tool.name.bold(), tool.description);
        }

        println!("\n------------------------------------------");
        println!("Ready! Type \"help\" for assistance or \"exit\" to quit.");
        println!("------------------------------------------\n");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();
        loop {
            stdout.write_all(b"You: ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            match ChatCommand::classify(&line) {
                ChatCommand::Exit => break,
                ChatCommand::Help => println!("\n{}\n", HELP_TEXT),
                ChatCommand::Empty => continue,
                ChatCommand::Message(message) => println!("{}\n", self.respond(message).await),
            }
        }

        println!("{}", "Goodbye!".green());
        Ok(())
    }

    /// Send one message and render the reply for the terminal
    pub async fn respond(&self, message: &str) -> String {
        if self.local_shortcuts
            && let Some(shortcut) = shortcut::detect(message)
        {
            log::info!("Local shortcut: {} {:?}", shortcut.tool_id(), shortcut);
            return match self.client.execute(shortcut.tool_id(), &shortcut.parameters()).await {
                Ok(reply) if reply.is_success() => format!(
                    "\n{} {} (local shortcut)\n{} {}",
                    "Tool used:".green(),
                    shortcut.tool_id(),
                    "Result:".green(),
                    pretty(&reply.body)
                ),
                Ok(reply) => render_error(&reply),
                Err(e) => format!("{} {}", "Error:".red(), e),
            };
        }

        match self.client.agent(message).await {
            Ok(reply) if reply.is_success() => render_agent(&reply.body),
            Ok(reply) => render_error(&reply),
            Err(e) => {
                log::error!("Agent request failed: {}", e);
                format!("{} {}", "Error:".red(), e)
            }
        }
    }
}

fn render_agent(body: &Value) -> String {
    let explanation = body.get("explanation").and_then(Value::as_str).unwrap_or_default();
    let tool = body.get("toolUsed").and_then(Value::as_str).unwrap_or("unknown");
    let result = body.get("result").cloned().unwrap_or(Value::Null);
    format!(
        "\n{} {}\n{} {}\n{} {}",
        "Explanation:".green(),
        explanation,
        "Tool used:".green(),
        tool,
        "Result:".green(),
        pretty(&result)
    )
}

fn render_error(reply: &GatewayReply) -> String {
    log::warn!("Gateway returned {}: {}", reply.status, reply.body);
    format!("{} {}", "Error:".red(), reply.error_message())
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
