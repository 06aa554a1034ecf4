// ==============================================================================
// parsers/mod.rs - File parser modules
// ==============================================================================
// Description: Parsers for input tables and engine result tables
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================

pub mod result_table;
pub mod table_csv;

pub use result_table::{ResultTable, ResultTableError};
pub use table_csv::{DelimitedTableReader, TableLoadError};
