//! Clarity CLI - on-demand image triage: blur check plus AI description.
//!
//! Clarity fetches an image by URL, scores its sharpness with the variance of
//! the Laplacian, and asks a vision model to describe it if it is sharp enough.
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP service (GET /detect-image?url=...)
//! clarity serve --port 8000
//!
//! # Triage a single image from the terminal
//! clarity analyze https://example.com/photo.jpg
//!
//! # View configuration
//! clarity config show
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod api;
mod cli;
mod logging;
mod state;

/// Clarity - on-demand image triage: blur check plus AI description.
#[derive(Parser, Debug)]
#[command(name = "clarity")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "CLARITY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP triage service
    Serve(cli::serve::ServeArgs),

    /// Triage a single image URL and print the JSON result
    Analyze(cli::analyze::AnalyzeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    // An explicit --config must load; the default location falls back to defaults.
    let config = match &cli.config {
        Some(path) => clarity_core::Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match clarity_core::Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `clarity config path`."
                );
                clarity_core::Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Clarity v{}", clarity_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Analyze(args) => cli::analyze::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config, cli.config).await,
    }
}
