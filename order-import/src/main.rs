mod cli;
mod config;
mod import;
mod logging;
mod repository;

use anyhow::Result;
use clap::Parser;

use cli::commands::{import::handle_import_command, migrate::handle_migrate_command};
use cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import(args) => handle_import_command(&cli.global, args).await,
        Commands::Migrate(args) => handle_migrate_command(&cli.global, args).await,
    }
}
