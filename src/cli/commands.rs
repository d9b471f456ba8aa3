//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - calculator: run the arithmetic service
//! - gateway: run the tool gateway
//! - chat: interactive client against a gateway

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Toolgate - a calculator service, an LLM tool gateway and a chat client
#[derive(Parser, Debug)]
#[command(name = "toolgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the calculator REST service
    Calculator {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the tool gateway
    Gateway {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Start an interactive chat session against a gateway
    Chat {
        /// Gateway base URL
        #[arg(short, long)]
        gateway_url: Option<String>,

        /// Send obvious add/multiply requests straight to /execute
        #[arg(long)]
        local_shortcuts: bool,
    },
}
