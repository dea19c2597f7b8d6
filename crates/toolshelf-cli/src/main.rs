//! toolshelf CLI
//!
//! Command-line interface for exporting and importing the toolshelf catalog.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use toolshelf_core::{Config, ImportMode, SqliteStore, StoreError, TransferError};

mod commands;
mod logging;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "toolshelf")]
#[command(about = "toolshelf - Export and import your catalog of tools")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use an alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the catalog to a dated JSON file
    Export {
        /// Directory to write into (defaults to export_dir from config)
        #[arg(short, long, conflicts_with = "stdout")]
        dir: Option<PathBuf>,
        /// Write the snapshot to stdout instead of a file
        #[arg(long)]
        stdout: bool,
    },
    /// Import a catalog snapshot
    Import {
        /// Snapshot file to read
        file: PathBuf,
        /// merge (keep existing data) or replace (clear first)
        #[arg(short, long)]
        mode: Option<ImportMode>,
        /// Skip the confirmation prompt for replace
        #[arg(short, long)]
        yes: bool,
    },
    /// Show catalog counts and storage location
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, export_dir, default_import_mode, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    if let Err(err) = run(cli, &output).await {
        eprintln!("Error: {:#}", err);
        if let Some(hint) = recovery_hint(&err) {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config.as_ref();

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, output)
            }
        };
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    logging::init(&config);

    let store = SqliteStore::open(&config).context("Failed to open catalog database")?;

    match cli.command {
        Commands::Export { dir, stdout } => {
            commands::export::run(&store, &config, dir, stdout, output).await
        }
        Commands::Import { file, mode, yes } => {
            let mode = mode.unwrap_or(config.default_import_mode);
            commands::import::run(&store, &file, mode, yes, output).await
        }
        Commands::Status => commands::status::show(&store, &config, output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// Find a store failure anywhere in the error chain and return its suggestion
fn recovery_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        if let Some(store_err) = cause.downcast_ref::<StoreError>() {
            return store_err.recovery_suggestion();
        }
        match cause.downcast_ref::<TransferError>() {
            Some(TransferError::Store(store_err)) => store_err.recovery_suggestion(),
            _ => None,
        }
    })
}
