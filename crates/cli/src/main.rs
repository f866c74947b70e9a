//! Labor-law counsel CLI
//!
//! Main entry point for the counsel command-line tool.
//! Answers Vietnamese labor-law questions from a knowledge graph and a
//! passage index.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, IndexCommand, InfoCommand};
use counsel_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Counsel - Vietnamese labor-law question answering
#[derive(Parser, Debug)]
#[command(name = "counsel")]
#[command(about = "Vietnamese labor-law question answering over a knowledge graph", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "COUNSEL_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "COUNSEL_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (gemini, ollama)
    #[arg(short, long, global = true, env = "COUNSEL_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "COUNSEL_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a single question
    Ask(AskCommand),

    /// Interactive conversation on stdin
    Chat(ChatCommand),

    /// Create the entity full-text index
    Index(IndexCommand),

    /// Show configuration and backend reachability
    Info(InfoCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(cli.workspace.clone(), cli.config.clone())?;

    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_json)?;

    tracing::info!("Counsel CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Index(_) => "index",
        Commands::Info(_) => "info",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Index(cmd) => cmd.execute(&config).await,
        Commands::Info(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
