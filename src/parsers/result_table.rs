// ==============================================================================
// parsers/result_table.rs - Engine Result Table Parser
// ==============================================================================
// Description: Parser for the header-bearing CSV tables written by the engine
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================
// Format examples:
//   Purity,SNP_A,SNP_B                (p2, sorted when -sort is given)
//   0.4375,a,c
//
//   SNP,SNP_P,PAIR_P,TRIPLET_P,QUADLET_P,SNP_IG,PAIR_IG,...,QUADLET_3   (best_ig)
//   a,0.375,0.5,...
// ==============================================================================

use csv::ReaderBuilder;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while parsing an engine result table
#[derive(Error, Debug)]
pub enum ResultTableError {
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Invalid numeric value '{value}' in column {column}, row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },
}

/// One parsed result table: column names plus string cells
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    /// Parse a CSV file whose first line names the columns
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ResultTableError> {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path.as_ref())?;
        Self::from_reader(reader)
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self, ResultTableError> {
        let headers = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Values of column `name`; short rows yield empty strings
    pub fn column(&self, name: &str) -> Result<Vec<&str>, ResultTableError> {
        let index = self
            .column_index(name)
            .ok_or_else(|| ResultTableError::UnknownColumn(name.to_string()))?;

        Ok(self
            .rows
            .iter()
            .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
            .collect())
    }

    /// Values of column `name` parsed as floating point scores
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, ResultTableError> {
        self.column(name)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value.trim().parse::<f64>().map_err(|_| ResultTableError::InvalidValue {
                    column: name.to_string(),
                    row,
                    value: value.to_string(),
                })
            })
            .collect()
    }
}
