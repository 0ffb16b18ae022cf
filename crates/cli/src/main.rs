//! Invoicer CLI - fixture seeding and database tools.
//!
//! # Usage
//!
//! ```bash
//! # Replace all invoicing data with the development fixtures
//! invoicer-cli seed
//!
//! # Seed from a custom fixture file, pinned to a specific day
//! invoicer-cli seed --fixtures demo.yaml --as-of 2026-01-31
//!
//! # Validate fixtures without touching the database
//! invoicer-cli seed --dry-run
//!
//! # Show row counts
//! invoicer-cli stats
//! ```
//!
//! # Commands
//!
//! - `seed` - Delete users and customers, then insert the fixture set in one transaction
//! - `stats` - Report row counts for the seeded tables

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use invoicer_cli::config::LogFormat;
use invoicer_cli::logging;

mod commands;

#[derive(Parser)]
#[command(name = "invoicer-cli")]
#[command(author, version, about = "Invoicer database tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace all users and customers with the fixture set
    Seed {
        /// Load fixtures from this YAML file instead of the built-in set
        #[arg(short, long, value_name = "PATH")]
        fixtures: Option<PathBuf>,

        /// Resolve fixture dates against this day instead of today (UTC)
        #[arg(long, value_name = "YYYY-MM-DD")]
        as_of: Option<NaiveDate>,

        /// Validate the fixtures and report counts without touching the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Show row counts for the seeded tables
    Stats,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let log_format = LogFormat::from_env();
    logging::init(log_format.as_ref().copied().unwrap_or_default());
    if let Err(e) = &log_format {
        tracing::warn!("{e}; falling back to pretty logs");
    }

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed {
            fixtures,
            as_of,
            dry_run,
        } => {
            commands::seed::run(commands::seed::SeedOptions {
                fixtures,
                as_of,
                dry_run,
            })
            .await?;
        }
        Commands::Stats => commands::stats::run().await?,
    }
    Ok(())
}
