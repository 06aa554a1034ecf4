// ==============================================================================
// input.rs - Input Table Normalization
// ==============================================================================
// Description: Converts the accepted tabular representations into canonical
//              ordered rows
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================
// Accepted shapes:
//   Rows     - sequence of rows, header (if any) already included
//   Columnar - named, typed columns (structured-array layout)
//   Labeled  - column labels plus row-major values (data-frame layout)
// ==============================================================================

use thiserror::Error;

use crate::models::{Cell, Row};

/// Errors raised while reducing an input table to rows
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("Column '{column}' has {found} values, expected {expected} (columns must be equal length)")]
    RaggedColumns {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Labeled table row {row} has {found} values but {expected} column labels")]
    LabelWidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Whether the column labels of a table become its first row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
    /// Emit column labels as row 0 (genotype tables)
    Include,
    /// Drop column labels (sample tables)
    Omit,
}

/// Typed values of one column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Text(Vec<String>),
    UInt8(Vec<u8>),
    Int(Vec<i64>),
    Float(Vec<f64>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Text(v) => v.len(),
            ColumnValues::UInt8(v) => v.len(),
            ColumnValues::Int(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, index: usize) -> Cell {
        match self {
            ColumnValues::Text(v) => Cell::Text(v[index].clone()),
            ColumnValues::UInt8(v) => Cell::from(v[index]),
            ColumnValues::Int(v) => Cell::Int(v[index]),
            ColumnValues::Float(v) => Cell::Float(v[index]),
        }
    }
}

/// A named column of a [`ColumnarArray`]
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Columnar table with one element type per column
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnarArray {
    pub columns: Vec<Column>,
}

/// Row-major table carrying its own column labels
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabeledTable {
    pub columns: Vec<String>,
    pub values: Vec<Row>,
}

/// Any accepted input table representation
#[derive(Debug, Clone, PartialEq)]
pub enum TableInput {
    Rows(Vec<Row>),
    Columnar(ColumnarArray),
    Labeled(LabeledTable),
}

impl From<Vec<Row>> for TableInput {
    fn from(rows: Vec<Row>) -> Self {
        TableInput::Rows(rows)
    }
}

impl From<ColumnarArray> for TableInput {
    fn from(array: ColumnarArray) -> Self {
        TableInput::Columnar(array)
    }
}

impl From<LabeledTable> for TableInput {
    fn from(table: LabeledTable) -> Self {
        TableInput::Labeled(table)
    }
}

/// Reduce any accepted representation to canonical rows.
///
/// `Rows` input is returned unchanged regardless of `header`: a caller
/// supplying raw rows is expected to include the header row itself.
pub fn normalize(input: TableInput, header: HeaderMode) -> Result<Vec<Row>, NormalizeError> {
    match input {
        TableInput::Rows(rows) => Ok(rows),
        TableInput::Columnar(array) => columnar_to_rows(array, header),
        TableInput::Labeled(table) => labeled_to_rows(table, header),
    }
}

fn columnar_to_rows(array: ColumnarArray, header: HeaderMode) -> Result<Vec<Row>, NormalizeError> {
    let height = array.columns.first().map(|c| c.values.len()).unwrap_or(0);

    for column in &array.columns {
        if column.values.len() != height {
            return Err(NormalizeError::RaggedColumns {
                column: column.name.clone(),
                expected: height,
                found: column.values.len(),
            });
        }
    }

    let mut rows = Vec::with_capacity(height + 1);
    if header == HeaderMode::Include {
        rows.push(
            array
                .columns
                .iter()
                .map(|c| Cell::Text(c.name.clone()))
                .collect(),
        );
    }

    for i in 0..height {
        rows.push(array.columns.iter().map(|c| c.values.cell(i)).collect());
    }

    Ok(rows)
}

fn labeled_to_rows(table: LabeledTable, header: HeaderMode) -> Result<Vec<Row>, NormalizeError> {
    let width = table.columns.len();

    if let Some((row, values)) = table
        .values
        .iter()
        .enumerate()
        .find(|(_, values)| values.len() != width)
    {
        return Err(NormalizeError::LabelWidthMismatch {
            row,
            expected: width,
            found: values.len(),
        });
    }

    let mut rows = Vec::with_capacity(table.values.len() + 1);
    if header == HeaderMode::Include {
        rows.push(table.columns.into_iter().map(Cell::Text).collect());
    }
    rows.extend(table.values);

    Ok(rows)
}
