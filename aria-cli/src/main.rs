//! CLI entry point for aria

use anyhow::Result;
use aria_agent::CompletionGateway;
use aria_core::config::{Config, ConfigLoader};
use aria_core::conversation::{ConversationStore, SweepService};
use aria_core::logging::init_logging;
use aria_core::{Clock, SystemClock};
use aria_providers::{LLMProvider, OpenAIClient};
use aria_server::{run_server, AppState};
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "aria")]
#[command(about = "Aria, an AI travel assistant for Air New Zealand customers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Send one message through the gateway and print the reply
    Ask {
        /// Message to send
        #[arg(short, long)]
        message: String,
        /// Conversation key
        #[arg(short, long, default_value = "cli")]
        client: String,
    },
    /// Show resolved configuration
    Status,
}

/// Everything a running gateway needs
struct Runtime {
    gateway: Arc<CompletionGateway>,
    store: Arc<ConversationStore>,
    clock: Arc<dyn Clock>,
}

impl Runtime {
    fn build(config: &Config) -> Result<Self> {
        let provider: Arc<dyn LLMProvider> = Arc::new(OpenAIClient::from_config(&config.provider)?);
        let store = Arc::new(ConversationStore::from_config(&config.memory));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let gateway = Arc::new(CompletionGateway::from_config(
            config,
            Arc::clone(&store),
            provider,
            Arc::clone(&clock),
        ));
        Ok(Self {
            gateway,
            store,
            clock,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config_loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };

    let mut config = config_loader.load()?;
    let _log_guard = init_logging(&config.logging);

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            info!("Starting server");
            run_serve(config).await?;
        }
        Commands::Ask { message, client } => {
            run_ask(&config, &message, &client).await?;
        }
        Commands::Status => {
            run_status(&config_loader, &config);
        }
    }

    Ok(())
}

async fn run_serve(config: Config) -> Result<()> {
    let runtime = Runtime::build(&config)?;

    let sweeper = Arc::new(SweepService::new(
        Arc::clone(&runtime.store),
        Arc::clone(&runtime.clock),
        config.memory.sweep_interval(),
    ));
    sweeper.start().await;

    if config.provider.api_key.trim().is_empty() {
        println!(
            "{}",
            style("Warning: no API key configured, every reply will be the fallback text").yellow()
        );
    }
    println!("{}", style("Aria AI Brain starting...").bold().cyan());
    println!("Model: {}", config.provider.model);
    println!("Listening on {}:{}", config.server.host, config.server.port);

    let state = AppState::new(
        Arc::clone(&runtime.gateway),
        Arc::clone(&sweeper),
        config.server.trust_forwarded_for,
    );
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                println!("\n{}", style("Shutting down...").yellow());
                let _ = shutdown_tx.send(());
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    });

    println!("\n{}", style("Server is running. Press Ctrl+C to stop.").green());

    let result = run_server(state, &config.server, shutdown_rx).await;
    sweeper.stop().await;
    result?;

    println!("{}", style("Server stopped.").green());
    Ok(())
}

async fn run_ask(config: &Config, message: &str, client: &str) -> Result<()> {
    let message = aria_agent::validate_message(Some(message))?;
    let runtime = Runtime::build(config)?;

    let reply = runtime.gateway.respond(client, message).await;
    if reply.is_fallback() {
        println!("{}", style(&reply.text).yellow());
    } else {
        println!("{}", reply.text);
    }
    Ok(())
}

fn run_status(loader: &ConfigLoader, config: &Config) {
    println!("{}", style("Aria Status").bold().cyan());
    println!("Version: {}\n", env!("CARGO_PKG_VERSION"));

    println!("{}", style("Configuration:").bold());
    println!("  Config directory: {}", loader.config_dir().display());
    println!();

    println!("{}", style("Provider:").bold());
    println!("  API base: {}", config.provider.api_base);
    println!("  Model: {}", config.provider.model);
    let key_status = if config.provider.api_key.trim().is_empty() {
        style("not configured".to_string()).red()
    } else {
        style(mask_key(&config.provider.api_key)).green()
    };
    println!("  API key: {}", key_status);
    println!("  Timeout: {}s", config.provider.timeout_secs);
    println!();

    println!("{}", style("Memory:").bold());
    println!("  Max history: {}", config.memory.max_history);
    println!("  Context turns: {}", config.memory.context_turns);
    println!("  Retention: {}h", config.memory.retention_hours);
    println!("  Sweep interval: {}m", config.memory.sweep_interval_minutes);
    println!();

    println!("{}", style("Server:").bold());
    println!("  Address: {}:{}", config.server.host, config.server.port);
    println!("  Static dir: {}", config.server.static_dir);
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.trim().chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
