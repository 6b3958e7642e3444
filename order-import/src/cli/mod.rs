//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use commands::import::ImportCommands;
use commands::migrate::MigrateCommands;

#[derive(Parser, Debug)]
#[command(name = "order-import", version, about = "Import order spreadsheets into SQLite")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// TOML configuration file (defaults to ./order-import.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load orders from a spreadsheet and upsert them into the database
    Import(ImportCommands),
    /// Create or update the database schema
    Migrate(MigrateCommands),
}
