//! Schema setup, run explicitly and never as part of an import

use std::path::Path;

use anyhow::{Context, Result};
use sqlx::Connection;
use sqlx::migrate::Migrator;

use super::orders::open_store;

/// Migrations embedded from `migrations/`
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Create the database if needed and bring its schema up to date
pub async fn run(path: &Path) -> Result<()> {
    let mut conn = open_store(path, true).await?;

    let result = MIGRATOR
        .run(&mut conn)
        .await
        .with_context(|| format!("Failed to migrate database: {}", path.display()));

    if let Err(e) = conn.close().await {
        log::warn!("Failed to close database {}: {}", path.display(), e);
    }

    result?;
    log::info!("Database schema at {} is up to date", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_creates_order_table_and_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.db");

        run(&path).await.unwrap();
        run(&path).await.unwrap();

        let mut conn = open_store(&path, false).await.unwrap();
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'Order'",
        )
        .fetch_one(&mut conn)
        .await
        .unwrap();
        assert_eq!(count, 1);
    }
}
