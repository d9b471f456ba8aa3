use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, info};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;
use toolgate::chat::{ChatSession, GatewayClient};
use toolgate::gateway::AppState;
use toolgate::llm::{AnthropicClient, LlmClient};
use toolgate::logs::CloudWatchLogs;
use toolgate::tools::{CalculatorClient, ToolExecutor, ToolRegistry};

/// Level used until the config file has been read
fn startup_level(verbose: bool) -> LevelFilter {
    if verbose { LevelFilter::Debug } else { LevelFilter::Info }
}

/// Level once the config is known; `--verbose` wins, unparseable values fall back to info
fn configured_level(verbose: bool, configured: Option<&str>) -> LevelFilter {
    if verbose {
        return LevelFilter::Debug;
    }
    configured.and_then(|level| level.parse().ok()).unwrap_or(LevelFilter::Info)
}

fn rust_log_set() -> bool {
    std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_some()
}

/// Servers log to stderr; the chat client logs to a file so the terminal stays clean
///
/// Without RUST_LOG the filter admits everything and the global max level gates output.
fn setup_logging(to_file: bool, verbose: bool) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace"));

    let log_file = if to_file {
        let log_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("toolgate")
            .join("logs");

        fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

        let log_file = log_dir.join("toolgate.log");
        let target = Box::new(
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file)
                .context("Failed to open log file")?,
        );
        builder.target(env_logger::Target::Pipe(target));
        Some(log_file)
    } else {
        None
    };

    builder.init();
    if !rust_log_set() {
        log::set_max_level(startup_level(verbose));
    }

    if let Some(log_file) = log_file {
        info!("Logging initialized, writing to: {}", log_file.display());
    }
    Ok(())
}

fn apply_config_level(verbose: bool, config: &Config) {
    if !rust_log_set() {
        log::set_max_level(configured_level(verbose, config.log_level.as_deref()));
    }
}

async fn serve(app: axum::Router, port: u16, label: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .context(format!("Failed to bind port {}", port))?;

    info!("{} running on port {}", label, port);
    println!("{} running on port {}", label.green(), port);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn run_calculator(port: u16) -> Result<()> {
    serve(toolgate::calculator::build_app(), port, "Calculator API").await
}

async fn run_gateway(port: u16, config: &Config) -> Result<()> {
    let registry = Arc::new(ToolRegistry::builtin());
    info!("Registered {} tools: {:?}", registry.len(), registry.ids());

    let calculator = CalculatorClient::new(&config.gateway.calculator_url, config.gateway.request_timeout())
        .context("Failed to create calculator client")?;
    let logs = CloudWatchLogs::connect(&config.logs.region).await;
    let llm = AnthropicClient::from_env(config.llm.to_anthropic()).context("Failed to create model client")?;
    info!(
        "Model {} (ready: {}), log search in {}",
        llm.model(),
        llm.is_ready(),
        logs.region()
    );

    let executor = Arc::new(ToolExecutor::new(registry, calculator, Arc::new(logs)));
    let state = Arc::new(AppState::new(Arc::new(llm), executor));

    serve(toolgate::gateway::build_app(state), port, "Tool gateway").await
}

async fn run_chat(gateway_url: &str, local_shortcuts: bool) -> Result<()> {
    let client = GatewayClient::new(gateway_url, Duration::from_secs(120)).context("Failed to create gateway client")?;
    ChatSession::new(client, local_shortcuts)
        .run()
        .await
        .context(format!("Chat session with {} failed", gateway_url))?;
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Calculator { port } => run_calculator(port.unwrap_or(config.calculator.port)).await,
        Commands::Gateway { port } => run_gateway(port.unwrap_or(config.gateway.port), config).await,
        Commands::Chat {
            gateway_url,
            local_shortcuts,
        } => {
            let url = gateway_url.as_deref().unwrap_or(&config.chat.gateway_url);
            run_chat(url, *local_shortcuts || config.chat.local_shortcuts).await
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let to_file = matches!(cli.command, Commands::Chat { .. });
    setup_logging(to_file, cli.is_verbose()).context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    apply_config_level(cli.is_verbose(), &config);

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
