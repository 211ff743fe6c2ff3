//! Sweet Shop CLI - catalog seeding and environment checks.
//!
//! # Usage
//!
//! ```bash
//! # Validate the environment and probe Supabase
//! sweet-cli check
//!
//! # Seed the catalog from a YAML file
//! sweet-cli seed --file demos/catalog.yaml
//! ```
//!
//! # Commands
//!
//! - `check` - Validate configuration and probe Supabase
//! - `seed` - Seed the catalog from a YAML file

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sweet-cli")]
#[command(author, version, about = "Sweet Shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration and probe Supabase
    Check,
    /// Seed the catalog from a YAML file
    Seed {
        /// Path to the YAML catalog file
        #[arg(short, long)]
        file: String,

        /// Insert sweets whose names are already listed instead of skipping them
        #[arg(long)]
        allow_duplicates: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Check => commands::check::run().await?,
        Commands::Seed {
            file,
            allow_duplicates,
        } => {
            commands::seed::catalog(&file, allow_duplicates).await?;
        }
    }
    Ok(())
}
