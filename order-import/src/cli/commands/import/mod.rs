//! Import command arguments

mod handler;

use std::path::PathBuf;

use clap::Args;

use crate::config::ImportConfig;

pub use handler::handle_import_command;

#[derive(Args, Debug, Clone, Default)]
pub struct ImportCommands {
    /// Spreadsheet to read (first worksheet is used)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// SQLite database containing the Order table
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Append log lines to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log to stderr instead of a file
    #[arg(long, conflicts_with = "log_file")]
    pub no_log_file: bool,

    /// Required order_id prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Import every row without checking order_id
    #[arg(long)]
    pub no_validate: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl ImportCommands {
    /// Layer the flags given on the command line over `config`
    pub fn apply(&self, config: &mut ImportConfig) {
        if let Some(file) = &self.file {
            config.input_path = file.clone();
        }
        if let Some(db) = &self.db {
            config.database_path = db.clone();
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = Some(log_file.clone());
        }
        if self.no_log_file {
            config.log_file = None;
        }
        if let Some(prefix) = &self.prefix {
            config.id_prefix = prefix.clone();
        }
        if self.no_validate {
            config.validate_ids = false;
        }
    }
}
