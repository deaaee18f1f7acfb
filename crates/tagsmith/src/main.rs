//! Tagsmith CLI - ranked tags with confidence scores for any image.
//!
//! Tagsmith runs a multi-label classifier over an image and prints the tags
//! scoring above a threshold, as JSON, JSON Lines, or CSV.
//!
//! # Usage
//!
//! ```bash
//! # Tag a single image (file or URL)
//! tagsmith tag image.jpg --threshold 0.3
//!
//! # Keep the full ranking and re-filter it later without re-running the model
//! tagsmith tag image.jpg --save-ranked ranked.json
//! tagsmith rethreshold ranked.json --threshold 0.5
//!
//! # Tag a folder, or a text file of paths/URLs
//! tagsmith batch ./photos/ --format csv --output tags.csv
//!
//! # Check the model and catalog
//! tagsmith models check
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Tagsmith - ranked tags with confidence scores for any image.
#[derive(Parser, Debug)]
#[command(name = "tagsmith")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Tag a single image file or URL
    Tag(cli::tag::TagArgs),

    /// Tag every image in a folder or listed in a text file
    Batch(cli::batch::BatchArgs),

    /// Re-filter a saved ranking at a new threshold
    Rethreshold(cli::rethreshold::RethresholdArgs),

    /// Inspect the tagger model and tag catalog
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match tagsmith_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `tagsmith config path`."
            );
            tagsmith_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Tagsmith v{}", tagsmith_core::VERSION);

    match cli.command {
        Commands::Tag(args) => cli::tag::execute(args, config).await,
        Commands::Batch(args) => cli::batch::execute(args, config).await,
        Commands::Rethreshold(args) => cli::rethreshold::execute(args),
        Commands::Models(args) => cli::models::execute(args, config),
        Commands::Config(args) => cli::config::execute(args),
    }
}
