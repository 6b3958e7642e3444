//! Import command handler

use anyhow::Result;
use colored::*;

use super::ImportCommands;
use crate::cli::GlobalArgs;
use crate::config::ImportConfig;
use crate::import::clean::Rejection;
use crate::import::{self, ImportError, RunOutcome};
use crate::logging::{self, CRITICAL};

/// Resolve configuration, run the import and print a summary
pub async fn handle_import_command(global: &GlobalArgs, args: ImportCommands) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let mut config = ImportConfig::load(global.config.as_deref())?;
    config.apply_env();
    args.apply(&mut config);

    logging::init(config.log_file.as_deref(), global.verbose)?;

    match std::env::current_dir() {
        Ok(dir) => log::info!("Current working directory: {}", dir.display()),
        Err(e) => log::debug!("Could not determine working directory: {}", e),
    }
    log::debug!("Configuration: {:?}", config);

    match import::run(&config).await {
        Ok(outcome) => {
            print_outcome(&outcome);
            Ok(())
        }
        Err(e) => {
            match failure_target(&e) {
                Some(target) => log::error!(target: target, "Unexpected failure: {:#}", e),
                None => log::error!("Import aborted: {:#}", e),
            }
            Err(e)
        }
    }
}

/// Typed import errors log as ERROR; anything else is unexpected and goes to CRITICAL
fn failure_target(e: &anyhow::Error) -> Option<&'static str> {
    if e.downcast_ref::<ImportError>().is_some() {
        None
    } else {
        Some(CRITICAL)
    }
}

fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::FileNotFound(path) => {
            println!("{} {}", "File not found:".yellow().bold(), path.display());
        }
        RunOutcome::EmptyBatch { rejected } => {
            println!("{}", "No valid rows to import".yellow().bold());
            print_rejections(rejected);
        }
        RunOutcome::Written {
            loaded,
            rejected,
            summary,
        } => {
            println!(
                "{} {} of {} row(s): {} inserted, {} updated",
                "Imported".green().bold(),
                summary.written(),
                loaded,
                summary.inserted,
                summary.updated
            );
            print_rejections(rejected);
            if !summary.failed.is_empty() {
                println!("{} {} row(s):", "Failed".red().bold(), summary.failed.len());
                for failure in &summary.failed {
                    println!("  {} {}", failure.order_id.red(), failure.reason.dimmed());
                }
            }
        }
    }
}

fn print_rejections(rejected: &[Rejection]) {
    if rejected.is_empty() {
        return;
    }

    println!("{} {} row(s):", "Rejected".yellow().bold(), rejected.len());
    for rejection in rejected {
        println!(
            "  row {} {} {}",
            rejection.row_number,
            rejection.order_id.yellow(),
            rejection.reason.to_string().dimmed()
        );
    }
}
