//! Command-line interface for typebridge
//!
//! # Usage Examples
//!
//! ```bash
//! # Nullable-time normalisation
//! typebridge time "2025-12-01 00:00:00"     # 2025-12-01
//! typebridge time "2024-02"                 # 2024-02-29
//!
//! # JSON column normalisation (stdin or --input)
//! typebridge column object-list --input row.json
//!
//! # Print the effective configuration
//! typebridge --config typebridge.toml config
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use typebridge::config::{Config, CONFIG_ENV};
use typebridge::inspect::{normalize_column, normalize_time, ColumnKind};
use typebridge::Copier;

#[derive(Parser)]
#[command(name = "typebridge")]
#[command(about = "Inspect column values the way typebridge converts them")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalise a datetime through the nullable-time converters
    Time {
        /// Datetime, date or year-month
        value: String,
    },

    /// Decode a JSON column and print its canonical encoding
    Column {
        /// Typed form of the column
        #[arg(value_enum)]
        kind: ColumnKind,

        /// Read the column from this file instead of stdin
        #[arg(long, value_name = "PATH")]
        input: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let copier = Copier::global();
    match cli.command {
        Commands::Time { value } => {
            println!("{}", normalize_time(copier, &value)?);
        }
        Commands::Column { kind, input } => {
            let bytes = match input {
                Some(path) => std::fs::read(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut buf = Vec::new();
                    std::io::stdin()
                        .read_to_end(&mut buf)
                        .context("Failed to read stdin")?;
                    buf
                }
            };
            println!("{}", normalize_column(copier, kind, &bytes)?);
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }
    Ok(())
}
