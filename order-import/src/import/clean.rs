//! Row validation and cleaning
//!
//! Rows failing the identifier check are dropped and reported; they never abort
//! the run. Survivors get blank cells nulled and a shared processing timestamp.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::ImportConfig;
use crate::import::types::{
    Batch, CellValue, LoadedTable, OrderRecord, RawOrderRow, TIMESTAMP_FORMAT,
};

/// Why a row was excluded from the batch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("order_id is empty")]
    MissingId,
    #[error("order_id '{0}' is not text")]
    NotText(String),
    #[error("order_id '{id}' does not start with '{prefix}'")]
    WrongPrefix { id: String, prefix: String },
}

/// A row dropped during validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub row_number: usize,
    pub order_id: String,
    pub reason: RejectReason,
}

/// Identifier format check: text starting with a fixed prefix
#[derive(Debug, Clone)]
pub struct IdRule {
    prefix: String,
}

impl IdRule {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Case-insensitive, surrounding whitespace ignored
    pub fn check(&self, value: &CellValue) -> Result<(), RejectReason> {
        let id = match value {
            CellValue::Empty => return Err(RejectReason::MissingId),
            CellValue::Text(s) => s.trim(),
            other => return Err(RejectReason::NotText(other.to_string())),
        };

        if id.is_empty() {
            return Err(RejectReason::MissingId);
        }

        if id.to_lowercase().starts_with(&self.prefix.to_lowercase()) {
            Ok(())
        } else {
            Err(RejectReason::WrongPrefix {
                id: id.to_string(),
                prefix: self.prefix.clone(),
            })
        }
    }
}

/// Cleaning behaviour; no rule means every row survives
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    pub id_rule: Option<IdRule>,
}

impl CleanOptions {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            id_rule: config
                .validate_ids
                .then(|| IdRule::new(config.id_prefix.clone())),
        }
    }
}

fn to_record(row: RawOrderRow, updated_at: &str) -> OrderRecord {
    let row_number = row.row_number;
    let [order_id, customer_name, carta_id, status, width_of_carta, shape_of_carta] = row.cells;

    // The key is stored trimmed so re-imports with stray spaces hit the same row
    let order_id = match order_id {
        CellValue::Text(s) => CellValue::Text(s.trim().to_string()),
        other => other,
    };

    OrderRecord {
        row_number,
        order_id: order_id.into_field(),
        customer_name: customer_name.into_field(),
        carta_id: carta_id.into_field(),
        status: status.into_field(),
        width_of_carta: width_of_carta.into_field(),
        shape_of_carta: shape_of_carta.into_field(),
        updated_at: updated_at.to_string(),
    }
}

/// Validate and clean a loaded table into a batch stamped with `stamped_at`
pub fn clean(table: LoadedTable, options: &CleanOptions, stamped_at: DateTime<Utc>) -> Batch {
    let stamped_at = stamped_at.format(TIMESTAMP_FORMAT).to_string();
    let mut records = Vec::with_capacity(table.len());
    let mut rejected = Vec::new();

    if let Some(rule) = &options.id_rule {
        log::debug!("Checking order_id prefix '{}'", rule.prefix());
    }

    for row in table.rows {
        if let Some(rule) = &options.id_rule {
            if let Err(reason) = rule.check(row.order_id()) {
                log::warn!("Row {}: skipping invalid row: {}", row.row_number, reason);
                rejected.push(Rejection {
                    row_number: row.row_number,
                    order_id: row.order_id().to_string(),
                    reason,
                });
                continue;
            }
        }

        records.push(to_record(row, &stamped_at));
    }

    if records.is_empty() {
        log::warn!("No valid rows remain after validation");
    } else {
        log::info!(
            "{} row(s) passed validation, {} rejected",
            records.len(),
            rejected.len()
        );
    }

    Batch {
        records,
        rejected,
        stamped_at,
    }
}
