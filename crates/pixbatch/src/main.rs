//! Pixbatch CLI - Batch image filtering with a parallel worker pool.
//!
//! Pixbatch reads every JPEG/PNG image in a directory, applies a grayscale or
//! blur filter, and writes PNG-encoded results under the same file names.
//!
//! # Usage
//!
//! ```bash
//! # Grayscale everything in ./images into ./output
//! pixbatch run
//!
//! # Blur a directory with 8 workers
//! pixbatch run ./photos -o ./blurred --filter blur --workers 8
//!
//! # View configuration
//! pixbatch config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// Pixbatch - Batch image filtering with a parallel worker pool.
#[derive(Parser, Debug)]
#[command(name = "pixbatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, env = "PIXBATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply a filter to every image in a directory
    Run(cli::run::RunArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match &cli.config {
        Some(path) => pixbatch_core::Config::load_from(path)?,
        None => match pixbatch_core::Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `pixbatch config path`."
                );
                pixbatch_core::Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Pixbatch v{}", pixbatch_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config, cli.config).await,
    }
}
