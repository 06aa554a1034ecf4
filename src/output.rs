// ==============================================================================
// output.rs - Run Report and Table Export
// ==============================================================================
// Description: Writes a finished computation as a JSON report and exports
//              its result tables as standalone CSV files
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::ingest::ResultSet;
use crate::models::ComputeOptions;
use crate::processor::{EpistasisRun, EpistasisSession};

/// Serializable summary of one engine computation
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub generated_at: String,
    pub engine_command: String,
    pub output_prefix: &'a Path,
    pub interchange_file: &'a Path,
    pub num_samples: usize,
    pub num_variants: usize,
    pub options: &'a ComputeOptions,
    pub elapsed_secs: f64,
    pub engine_output_lines: usize,
    pub results: &'a ResultSet,
}

impl<'a> RunReport<'a> {
    pub fn new(
        session: &'a EpistasisSession,
        options: &'a ComputeOptions,
        run: &'a EpistasisRun,
    ) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            engine_command: run.request.command_line(),
            output_prefix: &run.request.output_prefix,
            interchange_file: session.interchange_path(),
            num_samples: session.dataset().samples().len(),
            num_variants: session.dataset().num_variants(),
            options,
            elapsed_secs: run.summary.elapsed.as_secs_f64(),
            engine_output_lines: run.summary.output_lines,
            results: &run.results,
        }
    }
}

/// Write `report` as pretty-printed JSON
pub fn write_json_report(path: &Path, report: &RunReport<'_>) -> Result<PathBuf> {
    info!("Generating JSON report: {:?}", path);

    let file = std::fs::File::create(path).context("Failed to create JSON report file")?;

    serde_json::to_writer_pretty(file, report).context("Failed to write JSON report")?;

    info!("JSON report complete: {} result tables", report.results.len());
    Ok(path.to_path_buf())
}

/// Export each result table to `<dir>/<key>.csv`
pub fn write_tables(dir: &Path, results: &ResultSet) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create table directory {:?}", dir))?;

    let mut written = Vec::with_capacity(results.len());
    for (key, table) in results.iter() {
        let path = dir.join(format!("{}.csv", key));
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("Failed to create {:?}", path))?;

        writer
            .write_record(&table.headers)
            .with_context(|| format!("Failed to write header of {:?}", path))?;
        for row in &table.rows {
            writer
                .write_record(row)
                .with_context(|| format!("Failed to write row of {:?}", path))?;
        }
        writer.flush().with_context(|| format!("Failed to flush {:?}", path))?;

        written.push(path);
    }

    info!("Exported {} result tables to {:?}", written.len(), dir);
    Ok(written)
}
