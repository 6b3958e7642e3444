//! Value and record types shared by the load, clean and write stages

use std::fmt;

use calamine::Data;

/// Columns every input sheet must carry, in the order records are built from
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "order_id",
    "customer_name",
    "carta_id",
    "status",
    "width_of_carta",
    "shape_of_carta",
];

/// Format of `updated_at`, always UTC
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single spreadsheet cell, decoupled from the calamine representation
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl CellValue {
    /// Convert a calamine cell
    pub fn from_cell(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => {
                // Excel stores every number as a float; keep whole numbers integral
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    CellValue::Int(*f as i64)
                } else {
                    CellValue::Float(*f)
                }
            }
            Data::Bool(b) => CellValue::Bool(*b),
            // Display on ExcelDateTime is the raw serial day count
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(datetime) => CellValue::Text(datetime.format(TIMESTAMP_FORMAT).to_string()),
                None => CellValue::Text(format!("{}", dt)),
            },
            Data::DateTimeIso(s) => CellValue::Text(s.clone()),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(_) => CellValue::Empty,
        }
    }

    /// True for empty cells and strings that are only whitespace
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Map blank cells to an explicit null
    pub fn into_field(self) -> Field {
        if self.is_blank() { None } else { Some(self) }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A cleaned business field; `None` is stored as SQL NULL
pub type Field = Option<CellValue>;

/// One order row as extracted from the sheet, before cleaning
#[derive(Debug, Clone, PartialEq)]
pub struct RawOrderRow {
    /// 1-based spreadsheet row number
    pub row_number: usize,
    /// Cells in `REQUIRED_COLUMNS` order
    pub cells: [CellValue; 6],
}

impl RawOrderRow {
    pub fn order_id(&self) -> &CellValue {
        &self.cells[0]
    }
}

/// The sheet restricted to the required columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedTable {
    pub rows: Vec<RawOrderRow>,
}

impl LoadedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A cleaned order ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub row_number: usize,
    pub order_id: Field,
    pub customer_name: Field,
    pub carta_id: Field,
    pub status: Field,
    pub width_of_carta: Field,
    pub shape_of_carta: Field,
    pub updated_at: String,
}

impl OrderRecord {
    /// The primary key as stored, `None` when the identifier is null
    pub fn key(&self) -> Option<String> {
        self.order_id.as_ref().map(|v| v.to_string())
    }

    /// Identifier for log lines
    pub fn display_key(&self) -> String {
        self.key()
            .unwrap_or_else(|| format!("<null id, row {}>", self.row_number))
    }
}

/// Validated records from one file in one run
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub records: Vec<OrderRecord>,
    pub rejected: Vec<super::clean::Rejection>,
    pub stamped_at: String,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
