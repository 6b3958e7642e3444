//! Spreadsheet loading for order imports
//!
//! Only the first worksheet is read. Its first row is the header row; columns with
//! blank or "Unnamed" headers are export artifacts and are dropped before the
//! required columns are selected.

mod reader;

pub use reader::load_orders;
