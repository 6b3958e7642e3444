//! Read order rows from the first worksheet of a spreadsheet

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use regex::Regex;

use crate::import::ImportError;
use crate::import::types::{CellValue, LoadedTable, RawOrderRow, REQUIRED_COLUMNS};

/// Header pattern spreadsheet exports use for columns without a name
const PLACEHOLDER_PATTERN: &str = r"^Unnamed";

/// Every column of a worksheet, headers separated from data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    /// 1-based sheet row number of the header row
    pub header_row: usize,
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Read the first worksheet of any workbook format calamine recognises
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open spreadsheet: {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("Spreadsheet has no worksheets")?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    // The range begins at the first used cell, not necessarily A1
    let header_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(header_text).collect(),
        None => {
            log::warn!("Sheet '{}' is empty", sheet_name);
            return Ok(RawTable {
                header_row,
                ..RawTable::default()
            });
        }
    };

    let rows = rows
        .map(|row| row.iter().map(CellValue::from_cell).collect())
        .collect();

    log::debug!("Read sheet '{}' from {}", sheet_name, path.display());

    Ok(RawTable {
        headers,
        rows,
        header_row,
    })
}

fn is_placeholder(re: &Regex, header: &str) -> bool {
    header.is_empty() || re.is_match(header)
}

/// Remove columns whose header is blank or an "Unnamed" placeholder
pub fn drop_placeholder_columns(table: RawTable) -> Result<RawTable> {
    let re = Regex::new(PLACEHOLDER_PATTERN).context("Invalid placeholder header pattern")?;

    let keep: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !is_placeholder(&re, h))
        .map(|(i, _)| i)
        .collect();

    if keep.len() == table.headers.len() {
        return Ok(table);
    }

    log::debug!(
        "Dropping {} placeholder column(s)",
        table.headers.len() - keep.len()
    );

    let headers = keep.iter().map(|&i| table.headers[i].clone()).collect();
    let rows = table
        .rows
        .into_iter()
        .map(|row| {
            keep.iter()
                .map(|&i| row.get(i).cloned().unwrap_or(CellValue::Empty))
                .collect()
        })
        .collect();

    Ok(RawTable {
        headers,
        rows,
        header_row: table.header_row,
    })
}

/// Restrict the table to `REQUIRED_COLUMNS`, failing if any is absent
pub fn select_required(table: RawTable) -> Result<LoadedTable, ImportError> {
    let mut indices = [0usize; 6];
    let mut missing = Vec::new();

    for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
        match table.headers.iter().position(|h| h == name) {
            Some(i) => indices[slot] = i,
            None => missing.push(name.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(ImportError::MissingColumns(missing));
    }

    let mut rows = Vec::with_capacity(table.rows.len());
    for (offset, row) in table.rows.into_iter().enumerate() {
        let row_number = table.header_row + 1 + offset;
        let cells = indices.map(|i| row.get(i).cloned().unwrap_or(CellValue::Empty));

        if cells.iter().all(CellValue::is_blank) {
            log::debug!("Skipping empty row {}", row_number);
            continue;
        }

        rows.push(RawOrderRow { row_number, cells });
    }

    Ok(LoadedTable { rows })
}

/// Read, strip placeholders and select the required columns
pub fn load_orders<P: AsRef<Path>>(path: P) -> Result<LoadedTable> {
    let path = path.as_ref();
    let table = drop_placeholder_columns(read_table(path)?)?;

    log::debug!("Detected column headers: {}", table.headers.join(", "));

    let loaded = select_required(table)?;

    if loaded.is_empty() {
        log::warn!("No data rows found in {}", path.display());
    }

    log::info!("Selected columns: {}", REQUIRED_COLUMNS.join(", "));
    log::info!("Loaded {} row(s) from {}", loaded.len(), path.display());

    Ok(loaded)
}
