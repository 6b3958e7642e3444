//! Repository for the `Order` table
//!
//! Each row is written in its own transaction: the existing record is read, its
//! `created_by` kept, and the business fields replaced wholesale. A failed row is
//! rolled back and reported without touching the rest of the batch.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};

use crate::import::ImportError;
use crate::import::types::{Batch, CellValue, Field, OrderRecord};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// What an upsert did to the stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Inserted,
    Updated,
}

impl fmt::Display for UpsertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertAction::Inserted => write!(f, "Inserted"),
            UpsertAction::Updated => write!(f, "Updated"),
        }
    }
}

/// A row the store refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub order_id: String,
    pub reason: String,
}

/// Per-row outcome of writing a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Identifiers written, in batch order
    pub succeeded: Vec<String>,
    pub inserted: usize,
    pub updated: usize,
    pub failed: Vec<WriteFailure>,
}

impl WriteSummary {
    pub fn written(&self) -> usize {
        self.succeeded.len()
    }
}

/// Open a connection to the SQLite file at `path`
pub async fn open_store(path: &Path, create: bool) -> Result<SqliteConnection, ImportError> {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        .connect()
        .await
        .map_err(|source| ImportError::StoreConnection {
            path: path.to_path_buf(),
            source,
        })
}

fn bind_field<'q>(query: SqliteQuery<'q>, field: &Field) -> SqliteQuery<'q> {
    match field {
        None | Some(CellValue::Empty) => query.bind(None::<String>),
        Some(CellValue::Text(s)) => query.bind(s.clone()),
        Some(CellValue::Int(i)) => query.bind(*i),
        Some(CellValue::Float(f)) => query.bind(*f),
        Some(CellValue::Bool(b)) => query.bind(*b),
    }
}

/// Bind the business fields after `order_id`, in column order
fn bind_details<'q>(query: SqliteQuery<'q>, record: &OrderRecord) -> SqliteQuery<'q> {
    let query = bind_field(query, &record.customer_name);
    let query = bind_field(query, &record.carta_id);
    let query = bind_field(query, &record.status);
    let query = bind_field(query, &record.width_of_carta);
    bind_field(query, &record.shape_of_carta)
}

/// Insert or fully replace one order, preserving `created_by` of an existing row
pub async fn upsert_order(
    conn: &mut SqliteConnection,
    record: &OrderRecord,
    system_user: &str,
) -> Result<UpsertAction> {
    let key = record.key();
    let mut tx = conn.begin().await.context("Failed to start transaction")?;

    let existing: Option<(Option<String>,)> =
        sqlx::query_as(r#"SELECT created_by FROM "Order" WHERE order_id = ?"#)
            .bind(key.clone())
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to look up existing order")?;

    let action = match existing {
        Some((created_by,)) => {
            let created_by = created_by.unwrap_or_else(|| system_user.to_string());

            let query = sqlx::query(
                r#"
                UPDATE "Order"
                SET customer_name = ?, carta_id = ?, status = ?, width_of_carta = ?,
                    shape_of_carta = ?, created_by = ?, updated_by = ?, updated_at = ?
                WHERE order_id = ?
                "#,
            );
            bind_details(query, record)
                .bind(created_by)
                .bind(system_user.to_string())
                .bind(record.updated_at.clone())
                .bind(key)
                .execute(&mut *tx)
                .await
                .context("Failed to update order")?;

            UpsertAction::Updated
        }
        None => {
            let query = sqlx::query(
                r#"
                INSERT INTO "Order" (
                    order_id, customer_name, carta_id, status, width_of_carta,
                    shape_of_carta, created_by, updated_by, updated_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(key);
            bind_details(query, record)
                .bind(system_user.to_string())
                .bind(system_user.to_string())
                .bind(record.updated_at.clone())
                .execute(&mut *tx)
                .await
                .context("Failed to insert order")?;

            UpsertAction::Inserted
        }
    };

    tx.commit().await.context("Failed to commit order")?;

    Ok(action)
}

/// Upsert every record on an open connection, isolating row failures
pub async fn write_records(
    conn: &mut SqliteConnection,
    records: &[OrderRecord],
    system_user: &str,
) -> WriteSummary {
    let mut summary = WriteSummary::default();

    for record in records {
        let id = record.display_key();
        match upsert_order(conn, record, system_user).await {
            Ok(action) => {
                log::debug!("{} order {}", action, id);
                match action {
                    UpsertAction::Inserted => summary.inserted += 1,
                    UpsertAction::Updated => summary.updated += 1,
                }
                summary.succeeded.push(id);
            }
            Err(e) => {
                log::error!("Failed to write order {}: {:#}", id, e);
                summary.failed.push(WriteFailure {
                    order_id: id,
                    reason: format!("{:#}", e),
                });
            }
        }
    }

    log::info!(
        "Wrote {} order(s) ({} inserted, {} updated), {} failed",
        summary.written(),
        summary.inserted,
        summary.updated,
        summary.failed.len()
    );

    summary
}

/// Write a batch to the database at `path`
///
/// An empty batch never opens the store. The connection is closed once all rows
/// have been attempted; only failing to open it is an error.
pub async fn write_batch(
    path: &Path,
    batch: &Batch,
    system_user: &str,
) -> Result<WriteSummary, ImportError> {
    if batch.is_empty() {
        log::info!("Empty batch, nothing written");
        return Ok(WriteSummary::default());
    }

    let mut conn = open_store(path, false).await?;
    log::debug!("Opened database {}", path.display());

    let summary = write_records(&mut conn, &batch.records, system_user).await;

    if let Err(e) = conn.close().await {
        log::warn!("Failed to close database {}: {}", path.display(), e);
    }

    Ok(summary)
}
