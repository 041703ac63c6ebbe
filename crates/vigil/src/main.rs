//! Vigil CLI - describe detected objects with a generative-AI provider.
//!
//! Vigil takes the thumbnails of one detection event plus its metadata and
//! asks the configured backend (OpenAI, Azure OpenAI, Gemini, Ollama,
//! Anthropic) for a description.
//!
//! # Usage
//!
//! ```bash
//! # Describe a car seen in two snapshots
//! vigil describe --label car --meta color=red snap1.jpg snap2.jpg
//!
//! # List the providers linked into this build
//! vigil providers
//!
//! # View configuration
//! vigil config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// Vigil - describe detected objects with a generative-AI provider.
#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(short, long, global = true, env = "VIGIL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a description for one detection event
    Describe(cli::describe::DescribeArgs),

    /// List registered GenAI providers
    Providers,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `vigil config path`."
            );
            vigil_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Vigil v{}", vigil_core::VERSION);

    match cli.command {
        Commands::Describe(args) => cli::describe::execute(args, config).await,
        Commands::Providers => cli::providers::execute(&config),
        Commands::Config(args) => cli::config::execute(args, cli.config.as_deref(), &config),
    }
}
