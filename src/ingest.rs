// ==============================================================================
// ingest.rs - Engine Output Discovery and Parsing
// ==============================================================================
// Description: Collects the files one engine run wrote under its output prefix
//              and parses them into a keyed result set
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================
// Naming: <working_dir>/<prefix_token>.<suffix>
//   Purity.0.csv .. Purity.3.csv -> p1 .. p4
//   IG.0.csv     .. IG.3.csv     -> ig1 .. ig4
//   bestIG.csv                   -> best_ig
// ==============================================================================

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::models::ResultKey;
use crate::parsers::{ResultTable, ResultTableError};

/// Output files above this size are parsed but flagged in the log
pub const LARGE_OUTPUT_BYTES: u64 = 1_000_000_000;

/// Errors while collecting engine results; no partial result set survives one
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to list engine outputs: {0}")]
    Discovery(#[from] walkdir::Error),

    #[error("Engine wrote unrecognized output file {file:?}")]
    UnrecognizedOutput { file: PathBuf },

    #[error("Failed to parse {key} output {path:?}: {source}")]
    Parse {
        key: ResultKey,
        path: PathBuf,
        #[source]
        source: ResultTableError,
    },

    #[error("Engine produced no {key} output")]
    MissingOutput { key: ResultKey },
}

/// Parsed tables of one engine run, keyed by output kind
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    tables: BTreeMap<ResultKey, ResultTable>,
}

impl ResultSet {
    pub fn get(&self, key: ResultKey) -> Option<&ResultTable> {
        self.tables.get(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = ResultKey> + '_ {
        self.tables.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResultKey, &ResultTable)> {
        self.tables.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn is_large_output(size: u64) -> bool {
    size > LARGE_OUTPUT_BYTES
}

/// Output files of the run identified by `prefix_token`, keyed by result kind
pub fn discover(
    working_dir: &Path,
    prefix_token: &str,
) -> Result<BTreeMap<ResultKey, PathBuf>, IngestError> {
    let lead = format!("{}.", prefix_token);
    let mut found = BTreeMap::new();

    for entry in WalkDir::new(working_dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(suffix) = entry.file_name().to_str().and_then(|name| name.strip_prefix(&lead))
        else {
            continue;
        };

        let key = ResultKey::from_suffix(suffix).ok_or_else(|| IngestError::UnrecognizedOutput {
            file: entry.path().to_path_buf(),
        })?;

        let size = entry.metadata()?.len();
        if is_large_output(size) {
            warn!(
                "Output {:?} is {} bytes; loading it may take a long time",
                entry.path(),
                size
            );
        }

        found.insert(key, entry.into_path());
    }

    Ok(found)
}

/// Parse every output of a run and require each key in `expected`
pub fn ingest(
    working_dir: &Path,
    prefix_token: &str,
    expected: &BTreeSet<ResultKey>,
) -> Result<ResultSet, IngestError> {
    let files = discover(working_dir, prefix_token)?;

    if let Some(key) = expected.iter().find(|key| !files.contains_key(key)) {
        return Err(IngestError::MissingOutput { key: *key });
    }

    let mut tables = BTreeMap::new();
    for (key, path) in files {
        debug!("Reading {} from {:?}", key, path);
        let table = ResultTable::from_path(&path).map_err(|source| IngestError::Parse {
            key,
            path: path.clone(),
            source,
        })?;
        tables.insert(key, table);
    }

    info!("Loaded {} result tables", tables.len());
    Ok(ResultSet { tables })
}
