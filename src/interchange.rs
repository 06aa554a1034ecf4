// ==============================================================================
// interchange.rs - Interchange CSV Writer
// ==============================================================================
// Description: Serializes the aligned dataset into the engine's input file
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================
// Format (read by the engine, must stay bit-exact):
//   ,0,1,0,0
//   a,1,2,0,0
//   b,1,1,1,1
// No quoting or escaping; one row per line; every line ends in '\n'.
// ==============================================================================

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::aligner::AlignedDataset;
use crate::ids::IdGenerator;

/// Write `dataset` to `<working_dir>/<id>.csv` and return the path.
///
/// The file is created exclusively and never removed by this crate.
pub fn write_interchange(
    dataset: &AlignedDataset,
    working_dir: &Path,
    ids: &dyn IdGenerator,
) -> io::Result<PathBuf> {
    let path = working_dir.join(format!("{}.csv", ids.next_id()));
    debug!("Writing combined array to {:?}", path);

    let file = OpenOptions::new().write(true).create_new(true).open(&path)?;
    let mut writer = BufWriter::new(file);

    for row in dataset.rows() {
        let mut fields = row.iter();
        if let Some(first) = fields.next() {
            write!(writer, "{}", first)?;
        }
        for field in fields {
            write!(writer, ",{}", field)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(path)
}
