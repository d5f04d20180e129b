//! api-compat: API compatibility pipeline tool
//!
//! Validates pipeline configurations and documents their format.

use anyhow::{Context, Result};
use api_compat::cli;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "api-compat")]
#[command(version)]
#[command(about = "API compatibility pipeline tool", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  Configuration rejected
    2  Error occurred

EXAMPLES:
    # Check a pipeline configuration
    api-compat validate .api-compat.yaml

    # Editor support for configuration files
    api-compat schema -o api-compat.schema.json")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "API_COMPAT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a pipeline configuration and list every problem found
    Validate {
        /// Configuration file (defaults to --config or the discovered file)
        path: Option<PathBuf>,
    },

    /// Generate JSON Schema for the config file format
    Schema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (defaults or file)
    Show,
    /// Print recognized file names and the discovered config file
    Path,
    /// Generate an example .api-compat.yaml in the current directory
    Init,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(2);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut stdout = io::stdout().lock();
    match cli.command {
        Commands::Validate { path } => {
            cli::run_validate(path.as_deref().or(cli.config.as_deref()), &mut stdout)
        }
        Commands::Schema { output } => cli::run_schema(output, &mut stdout),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(cli.config.as_deref(), &mut stdout),
            ConfigAction::Path => cli::run_config_path(cli.config.as_deref(), &mut stdout),
            ConfigAction::Init => {
                let dir = std::env::current_dir().context("failed to read current directory")?;
                cli::run_config_init(&dir)
            }
        },
    }
}
