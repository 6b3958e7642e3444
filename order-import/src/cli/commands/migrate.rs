//! Migrate command handler

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::*;

use crate::cli::GlobalArgs;
use crate::config::ImportConfig;
use crate::logging;
use crate::repository::migrations;

#[derive(Args, Debug)]
pub struct MigrateCommands {
    /// SQLite database to create or update
    #[arg(long)]
    pub db: Option<PathBuf>,
}

pub async fn handle_migrate_command(global: &GlobalArgs, args: MigrateCommands) -> Result<()> {
    let mut config = ImportConfig::load(global.config.as_deref())?;
    config.apply_env();
    if let Some(db) = args.db {
        config.database_path = db;
    }

    logging::init(config.log_file.as_deref(), global.verbose)?;

    if let Err(e) = migrations::run(&config.database_path).await {
        log::error!("Migration failed: {:#}", e);
        return Err(e);
    }

    println!(
        "{} {}",
        "Schema up to date:".green().bold(),
        config.database_path.display()
    );
    Ok(())
}
