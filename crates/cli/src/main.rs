//! Switchback CLI, the main entry point.
//!
//! Commands:
//! - `run`: Run one task through the adaptive loop
//! - `batch`: Run a file of tasks through one agent
//! - `strategies`: List configured strategies and their availability
//! - `config`: Print the effective or default configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::RunOptions;

#[derive(Parser)]
#[command(
    name = "switchback",
    about = "Switchback: adaptive strategy-switching task runner",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging and a per-step trace
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single task
    Run {
        /// Task description
        #[arg(short, long)]
        task: String,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Run one task per non-empty line of a file, sharing what the agent learns
    Batch {
        /// File with one task per line
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        options: RunOptions,
    },

    /// List strategies and whether each is currently usable
    Strategies {
        /// Config file to read instead of ~/.switchback/config.toml
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print configuration as TOML (secrets omitted)
    Config {
        /// Print the built-in defaults instead of the effective config
        #[arg(long)]
        default: bool,

        /// Config file to read instead of ~/.switchback/config.toml
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries results only.
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Run { task, options } => commands::run::run(&task, &options, cli.verbose).await?,
        Commands::Batch { file, options } => {
            commands::batch::run(&file, &options, cli.verbose).await?
        }
        Commands::Strategies { config } => commands::strategies::run(config.as_deref())?,
        Commands::Config { default, config } => {
            commands::config_cmd::run(default, config.as_deref())?
        }
    }

    Ok(())
}
