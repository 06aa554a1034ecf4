// ==============================================================================
// lib.rs - BitEpi Bridge Library
// ==============================================================================
// Description: Library interface for preparing genotype/phenotype tables,
//              driving the BitEpi engine and loading its results
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================

pub mod aligner;
pub mod cleanup;
pub mod ids;
pub mod ingest;
pub mod input;
pub mod interchange;
pub mod invocation;
pub mod models;
pub mod output;
pub mod parsers;
pub mod processor;
pub mod runner;
pub mod validator;

pub use ingest::ResultSet;
pub use input::{Column, ColumnValues, ColumnarArray, LabeledTable, TableInput};
pub use models::{Cell, ComputeOptions, ResultKey, Row, SessionConfig, Thresholds};
pub use parsers::ResultTable;
pub use processor::{EpistasisError, EpistasisRun, EpistasisSession};
