// ==============================================================================
// parsers/table_csv.rs - Delimited Input Table Loader
// ==============================================================================
// Description: Loads genotype and sample tables from CSV/TSV files, plain or
//              gzip-compressed
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================
// Format examples:
//   Genotypes (header row names the samples):
//     SNP,S1,S2,S3
//     rs1,0,1,2
//   Samples (optional header, then id and label):
//     S1,1
//     S2,0
// Identifier columns stay text; every other cell is typed integer, then
// float, then text.
// ==============================================================================

use csv::ReaderBuilder;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::input::{LabeledTable, TableInput};
use crate::models::{Cell, Row};

/// Errors that can occur while loading an input table file
#[derive(Error, Debug)]
pub enum TableLoadError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("File is empty")]
    EmptyFile,
}

/// Reader for delimited input tables
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedTableReader {
    /// Field separator; `None` picks tab for `.tsv`/`.txt`, comma otherwise
    pub delimiter: Option<u8>,
}

impl DelimitedTableReader {
    pub fn new(delimiter: Option<u8>) -> Self {
        Self { delimiter }
    }

    /// Load a genotype table: the first line names the samples
    pub fn read_genotypes(&self, path: impl AsRef<Path>) -> Result<TableInput, TableLoadError> {
        let mut records = self.read_records(path.as_ref())?.into_iter();
        let columns = records.next().ok_or(TableLoadError::EmptyFile)?;
        let values: Vec<Row> = records.map(type_row).collect();

        debug!(
            "Loaded genotype table with {} variants and {} columns",
            values.len(),
            columns.len()
        );
        Ok(TableInput::Labeled(LabeledTable { columns, values }))
    }

    /// Load a sample table, dropping the first line when `has_header` is set
    pub fn read_samples(
        &self,
        path: impl AsRef<Path>,
        has_header: bool,
    ) -> Result<TableInput, TableLoadError> {
        let records = self.read_records(path.as_ref())?;
        if records.is_empty() {
            return Err(TableLoadError::EmptyFile);
        }

        let skip = usize::from(has_header);
        let rows: Vec<Row> = records.into_iter().skip(skip).map(type_row).collect();

        debug!("Loaded sample table with {} rows", rows.len());
        Ok(TableInput::Rows(rows))
    }

    fn read_records(&self, path: &Path) -> Result<Vec<Vec<String>>, TableLoadError> {
        let (stem, compressed) = match path.to_str().and_then(|p| p.strip_suffix(".gz")) {
            Some(stem) => (stem.to_string(), true),
            None => (path.to_string_lossy().into_owned(), false),
        };
        let delimiter = self.delimiter.unwrap_or_else(|| detect_delimiter(&stem));

        let file = File::open(path)?;
        let source: Box<dyn Read> = if compressed {
            Box::new(MultiGzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(source);

        let mut records = Vec::new();
        for record in reader.records() {
            records.push(record?.iter().map(str::to_string).collect());
        }
        Ok(records)
    }
}

fn detect_delimiter(name: &str) -> u8 {
    if name.ends_with(".tsv") || name.ends_with(".txt") {
        b'\t'
    } else {
        b','
    }
}

/// First field is an identifier and stays text
fn type_row(record: Vec<String>) -> Row {
    let mut fields = record.into_iter();
    let mut row = Row::new();
    if let Some(id) = fields.next() {
        row.push(Cell::Text(id));
    }
    row.extend(fields.map(|field| parse_cell(&field)));
    row
}

/// Integer if possible, then finite float, else the raw text
pub fn parse_cell(field: &str) -> Cell {
    let trimmed = field.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Cell::Int(value);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Cell::Float(value),
        _ => Cell::Text(field.to_string()),
    }
}
