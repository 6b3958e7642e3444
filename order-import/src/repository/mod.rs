//! Repository layer for database operations

pub mod migrations;
pub mod orders;
