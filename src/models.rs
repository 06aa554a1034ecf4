// ==============================================================================
// models.rs - Table, Threshold and Result Data Models
// ==============================================================================
// Description: Data structures shared by normalization, alignment, invocation
//              and result ingestion
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::time::Duration;

/// Threshold sentinel: compute the metric but record nothing (benchmarking)
pub const BENCHMARK_ONLY: f64 = -1.0;

/// Default engine executable name
pub const DEFAULT_ENGINE: &str = "BitEpi.o";

/// Default bound on the exit-status wait after the engine closes its output
pub const DEFAULT_EXIT_TIMEOUT: Duration = Duration::from_secs(5);

/// A single value in a heterogeneously typed input table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
}

/// One table row
pub type Row = Vec<Cell>;

impl Cell {
    /// Integral numeric value of the cell, if it has one.
    ///
    /// Text never counts as numeric, so `"1"` is not a valid genotype code.
    pub fn as_code(&self) -> Option<i64> {
        match self {
            Cell::Int(v) => Some(*v),
            Cell::Float(f) if is_integral(*f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn is_one_of(&self, domain: &[i64]) -> bool {
        self.as_code().is_some_and(|code| domain.contains(&code))
    }
}

/// Numeric cells compare by value, so `Int(1)` and `Float(1.0)` name the
/// same sample.
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.as_code(), other.as_code()) {
            return a == b;
        }
        match (self, other) {
            (Cell::Float(a), Cell::Float(b)) => a.to_bits() == b.to_bits(),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match (self, self.as_code()) {
            (_, Some(code)) => {
                0u8.hash(state);
                code.hash(state);
            }
            (Cell::Text(s), None) => {
                2u8.hash(state);
                s.hash(state);
            }
            (value, None) => {
                1u8.hash(state);
                if let Cell::Float(f) = value {
                    f.to_bits().hash(state);
                }
            }
        }
    }
}

/// Finite, whole and exactly representable as `i64`
fn is_integral(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{}", v),
            // Integral floats keep their ".0" so the source type stays visible
            Cell::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell::Int(value.into())
    }
}

impl From<u8> for Cell {
    fn from(value: u8) -> Self {
        Cell::Int(value.into())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

/// Logical key of one engine output table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKey {
    P1,
    P2,
    P3,
    P4,
    Ig1,
    Ig2,
    Ig3,
    Ig4,
    BestIg,
}

impl ResultKey {
    pub const ALL: [ResultKey; 9] = [
        ResultKey::P1,
        ResultKey::P2,
        ResultKey::P3,
        ResultKey::P4,
        ResultKey::Ig1,
        ResultKey::Ig2,
        ResultKey::Ig3,
        ResultKey::Ig4,
        ResultKey::BestIg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKey::P1 => "p1",
            ResultKey::P2 => "p2",
            ResultKey::P3 => "p3",
            ResultKey::P4 => "p4",
            ResultKey::Ig1 => "ig1",
            ResultKey::Ig2 => "ig2",
            ResultKey::Ig3 => "ig3",
            ResultKey::Ig4 => "ig4",
            ResultKey::BestIg => "best_ig",
        }
    }

    /// File suffix the engine appends (after `<prefix>.`) for this table.
    /// The engine numbers interaction orders from zero.
    pub fn suffix(&self) -> &'static str {
        match self {
            ResultKey::P1 => "Purity.0.csv",
            ResultKey::P2 => "Purity.1.csv",
            ResultKey::P3 => "Purity.2.csv",
            ResultKey::P4 => "Purity.3.csv",
            ResultKey::Ig1 => "IG.0.csv",
            ResultKey::Ig2 => "IG.1.csv",
            ResultKey::Ig3 => "IG.2.csv",
            ResultKey::Ig4 => "IG.3.csv",
            ResultKey::BestIg => "bestIG.csv",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.suffix() == suffix)
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Per-order recording thresholds for purity (`p*`) and information gain (`ig*`)
///
/// Each value is either absent, [`BENCHMARK_ONLY`], or a threshold in `[0, 1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub p1: Option<f64>,
    pub p2: Option<f64>,
    pub p3: Option<f64>,
    pub p4: Option<f64>,
    pub ig1: Option<f64>,
    pub ig2: Option<f64>,
    pub ig3: Option<f64>,
    pub ig4: Option<f64>,
}

impl Thresholds {
    /// Thresholds paired with their parameter name and output key, in engine
    /// argument order.
    pub fn entries(&self) -> [(&'static str, Option<f64>, ResultKey); 8] {
        [
            ("p1", self.p1, ResultKey::P1),
            ("p2", self.p2, ResultKey::P2),
            ("p3", self.p3, ResultKey::P3),
            ("p4", self.p4, ResultKey::P4),
            ("ig1", self.ig1, ResultKey::Ig1),
            ("ig2", self.ig2, ResultKey::Ig2),
            ("ig3", self.ig3, ResultKey::Ig3),
            ("ig4", self.ig4, ResultKey::Ig4),
        ]
    }
}

/// Parameters of one engine computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComputeOptions {
    pub thresholds: Thresholds,
    /// Worker threads for the engine; must be a positive integral value
    pub threads: f64,
    /// Sort each table from highest to lowest score
    pub sort: bool,
    /// Report only the most informative pair/triplet/quadlet per SNP
    pub best_ig: bool,
}

impl Default for ComputeOptions {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            threads: 2.0,
            sort: false,
            best_ig: false,
        }
    }
}

impl ComputeOptions {
    /// Output tables the engine must produce for these options.
    ///
    /// Best-IG mode makes the engine disregard every threshold, so it yields
    /// the `best_ig` table alone.
    pub fn expected_keys(&self) -> BTreeSet<ResultKey> {
        if self.best_ig {
            return BTreeSet::from([ResultKey::BestIg]);
        }

        self.thresholds
            .entries()
            .into_iter()
            .filter_map(|(_, value, key)| match value {
                Some(v) if v != BENCHMARK_ONLY => Some(key),
                _ => None,
            })
            .collect()
    }
}

/// Settings fixed for the lifetime of one session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory receiving the interchange file and engine outputs
    pub working_directory: PathBuf,
    /// Fail instead of warn when the two tables' samples differ
    pub strict_intersect: bool,
    /// Engine executable
    pub engine: PathBuf,
    /// Exit-status wait once the engine closes its output stream
    pub exit_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            working_directory: std::env::temp_dir(),
            strict_intersect: false,
            engine: PathBuf::from(DEFAULT_ENGINE),
            exit_timeout: DEFAULT_EXIT_TIMEOUT,
        }
    }
}
