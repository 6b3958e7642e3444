//! Spreadsheet to database import pipeline
//!
//! A run moves through `FileCheck -> Loaded -> Validated -> Written` once. A
//! missing input file ends the run quietly, missing columns or an unreachable
//! store abort it, and row-level problems are reported without stopping it.

pub mod clean;
pub mod excel;
pub mod types;

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use thiserror::Error;

use crate::config::ImportConfig;
use crate::repository::orders::{self, WriteSummary};

use clean::{CleanOptions, Rejection};

/// Failures that end a run
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Failed to open database {}: {source}", .path.display())]
    StoreConnection {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },
}

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// The input file did not exist; nothing was read or written
    FileNotFound(PathBuf),
    /// Every row was rejected; the store was not opened
    EmptyBatch { rejected: Vec<Rejection> },
    Written {
        loaded: usize,
        rejected: Vec<Rejection>,
        summary: WriteSummary,
    },
}

/// Execute one import with the given configuration
pub async fn run(config: &ImportConfig) -> Result<RunOutcome> {
    let input = &config.input_path;

    if !input.is_file() {
        log::error!("{}", ImportError::FileNotFound(input.clone()));
        return Ok(RunOutcome::FileNotFound(input.clone()));
    }

    let table = excel::load_orders(input)?;
    let loaded = table.len();

    let mut batch = clean::clean(table, &CleanOptions::from_config(config), Utc::now());
    let rejected = std::mem::take(&mut batch.rejected);

    if batch.is_empty() {
        log::warn!("Nothing to import from {}", input.display());
        return Ok(RunOutcome::EmptyBatch { rejected });
    }

    log::info!(
        "Writing {} order(s) stamped {} to {}",
        batch.len(),
        batch.stamped_at,
        config.database_path.display()
    );
    let summary =
        orders::write_batch(&config.database_path, &batch, &config.system_user).await?;

    Ok(RunOutcome::Written {
        loaded,
        rejected,
        summary,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use rust_xlsxwriter::Workbook;

    use super::types::CellValue;

    pub fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    /// Write a single-sheet workbook; empty cells are left unwritten
    pub fn write_workbook(path: &Path, headers: &[&str], rows: &[Vec<CellValue>]) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }

        for (r, row) in rows.iter().enumerate() {
            let r = r as u32 + 1;
            for (c, cell) in row.iter().enumerate() {
                let c = c as u16;
                match cell {
                    CellValue::Empty => {}
                    CellValue::Text(s) => {
                        sheet.write_string(r, c, s.as_str()).unwrap();
                    }
                    CellValue::Int(i) => {
                        sheet.write_number(r, c, *i as f64).unwrap();
                    }
                    CellValue::Float(f) => {
                        sheet.write_number(r, c, *f).unwrap();
                    }
                    CellValue::Bool(b) => {
                        sheet.write_boolean(r, c, *b).unwrap();
                    }
                }
            }
        }

        workbook.save(path).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{text, write_workbook};
    use super::types::{CellValue, REQUIRED_COLUMNS};
    use super::*;
    use crate::repository::migrations;
    use sqlx::ConnectOptions;
    use sqlx::sqlite::SqliteConnectOptions;
    use std::path::Path;

    fn order_row(id: &str, status: &str) -> Vec<CellValue> {
        vec![
            text(id),
            text("Alice"),
            text("C1"),
            text(status),
            CellValue::Int(10),
            text("round"),
        ]
    }

    fn config_in(dir: &Path) -> ImportConfig {
        ImportConfig {
            input_path: dir.join("mm.xlsx"),
            database_path: dir.join("orders.db"),
            ..ImportConfig::default()
        }
    }

    async fn stored(db: &Path) -> Vec<(String, String, String, String)> {
        let mut conn = SqliteConnectOptions::new().filename(db).connect().await.unwrap();
        sqlx::query_as(
            r#"SELECT order_id, status, created_by, updated_by FROM "Order" ORDER BY order_id"#,
        )
        .fetch_all(&mut conn)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_run_imports_valid_rows_and_preserves_creator() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        migrations::run(&config.database_path).await.unwrap();

        write_workbook(
            &config.input_path,
            &REQUIRED_COLUMNS,
            &[order_row("OR001", "new"), order_row("BAD1", "new")],
        );

        match run(&config).await.unwrap() {
            RunOutcome::Written {
                loaded,
                rejected,
                summary,
            } => {
                assert_eq!(loaded, 2);
                assert_eq!(rejected.len(), 1);
                assert_eq!(rejected[0].order_id, "BAD1");
                assert_eq!(summary.succeeded, vec!["OR001".to_string()]);
                assert!(summary.failed.is_empty());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        assert_eq!(
            stored(&config.database_path).await,
            vec![(
                "OR001".to_string(),
                "new".to_string(),
                "system".to_string(),
                "system".to_string()
            )]
        );

        write_workbook(
            &config.input_path,
            &REQUIRED_COLUMNS,
            &[order_row("OR001", "done"), order_row("BAD1", "new")],
        );
        run(&config).await.unwrap();

        assert_eq!(
            stored(&config.database_path).await,
            vec![(
                "OR001".to_string(),
                "done".to_string(),
                "system".to_string(),
                "system".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_run_without_input_file_ends_quietly() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let outcome = run(&config).await.unwrap();
        assert!(matches!(outcome, RunOutcome::FileNotFound(p) if p == config.input_path));
        assert!(!config.database_path.exists());
    }

    #[tokio::test]
    async fn test_run_with_only_rejected_rows_skips_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_workbook(
            &config.input_path,
            &REQUIRED_COLUMNS,
            &[order_row("BAD1", "new"), order_row("X2", "new")],
        );

        let outcome = run(&config).await.unwrap();
        assert!(matches!(outcome, RunOutcome::EmptyBatch { rejected } if rejected.len() == 2));
        assert!(!config.database_path.exists());
    }

    #[tokio::test]
    async fn test_run_on_corrupt_spreadsheet_is_unexpected() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        std::fs::write(&config.input_path, b"definitely not a zip archive").unwrap();

        let err = run(&config).await.unwrap_err();
        assert!(err.downcast_ref::<ImportError>().is_none());
        assert!(!config.database_path.exists());
    }

    #[tokio::test]
    async fn test_run_aborts_on_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_workbook(
            &config.input_path,
            &["order_id", "customer_name", "status"],
            &[vec![text("OR001"), text("Alice"), text("new")]],
        );

        let err = run(&config).await.unwrap_err();
        match err.downcast_ref::<ImportError>() {
            Some(ImportError::MissingColumns(missing)) => assert_eq!(
                missing,
                &vec![
                    "carta_id".to_string(),
                    "width_of_carta".to_string(),
                    "shape_of_carta".to_string()
                ]
            ),
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_fails_when_store_cannot_be_opened() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.database_path = dir.path().join("missing").join("orders.db");
        write_workbook(&config.input_path, &REQUIRED_COLUMNS, &[order_row("OR001", "new")]);

        let err = run(&config).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::StoreConnection { .. })
        ));
    }
}
