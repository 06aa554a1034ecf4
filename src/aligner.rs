// ==============================================================================
// aligner.rs - Sample Alignment of Genotype and Case/Control Tables
// ==============================================================================
// Description: Builds the combined dataset restricted to samples present in
//              both tables, in genotype-header column order
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================

use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::models::{Cell, Row};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignmentError {
    #[error("genotype array and sample array share no samples")]
    NoSharedSamples,

    #[error("Genotype row {row} has {found} fields, header has {expected}")]
    ShortGenotypeRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Combined label + genotype matrix handed to the engine
///
/// Row 0 is `("", label*)`; every further row is `(variant_id, code*)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedDataset {
    rows: Vec<Row>,
    samples: Vec<Cell>,
}

impl AlignedDataset {
    /// All rows, label row first
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Kept sample identifiers, in column order
    pub fn samples(&self) -> &[Cell] {
        &self.samples
    }

    pub fn num_variants(&self) -> usize {
        self.rows.len() - 1
    }
}

/// Align validated tables.
///
/// Rows too short for a kept column fail with `ShortGenotypeRow`; sample
/// rows without a label are ignored.
///
/// Walks the genotype header once, keeping column 0 and every sample column
/// whose identifier has a label; each variant row is then projected onto the
/// kept positions.
pub fn align(genotypes: &[Row], samples: &[Row]) -> Result<AlignedDataset, AlignmentError> {
    let labels: HashMap<&Cell, &Cell> = samples
        .iter()
        .filter_map(|row| Some((row.first()?, row.get(1)?)))
        .collect();

    let Some(header) = genotypes.first() else {
        return Err(AlignmentError::NoSharedSamples);
    };
    let mut kept = vec![0];
    let mut label_row: Row = vec![Cell::Text(String::new())];
    let mut kept_samples = Vec::new();

    for (i, sample) in header.iter().enumerate().skip(1) {
        if let Some(label) = labels.get(sample) {
            label_row.push((*label).clone());
            kept_samples.push(sample.clone());
            kept.push(i);
        }
    }

    if kept_samples.is_empty() {
        return Err(AlignmentError::NoSharedSamples);
    }

    let mut rows = Vec::with_capacity(genotypes.len());
    rows.push(label_row);
    for (n, row) in genotypes.iter().enumerate().skip(1) {
        let projected = kept
            .iter()
            .map(|&i| row.get(i).cloned())
            .collect::<Option<Row>>()
            .ok_or(AlignmentError::ShortGenotypeRow {
                row: n,
                expected: header.len(),
                found: row.len(),
            })?;
        rows.push(projected);
    }

    debug!(
        "Aligned dataset: {} of {} samples kept, {} variants",
        kept_samples.len(),
        header.len() - 1,
        rows.len() - 1
    );

    Ok(AlignedDataset {
        rows,
        samples: kept_samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genotypes() -> Vec<Row> {
        vec![
            vec!["SNP".into(), "S1".into(), "S2".into(), "S3".into(), "S4".into()],
            vec!["a".into(), 1.into(), 2.into(), 0.into(), 0.into()],
            vec!["b".into(), 1.into(), 1.into(), 1.into(), 1.into()],
            vec!["c".into(), 0.into(), 1.into(), 0.into(), 2.into()],
        ]
    }

    fn samples() -> Vec<Row> {
        vec![
            vec!["S1".into(), 0.into()],
            vec!["S2".into(), 1.into()],
            vec!["S3".into(), 0.into()],
            vec!["S4".into(), 0.into()],
        ]
    }

    #[test]
    fn test_full_overlap() {
        let dataset = align(&genotypes(), &samples()).unwrap();

        assert_eq!(dataset.num_variants(), 3);
        assert_eq!(
            dataset.rows()[0],
            vec![Cell::from(""), 0.into(), 1.into(), 0.into(), 0.into()]
        );
        assert_eq!(dataset.rows()[1], genotypes()[1]);
    }

    #[test]
    fn test_sample_order_does_not_change_columns() {
        let mut shuffled = samples();
        shuffled.reverse();
        shuffled.swap(0, 2);

        assert_eq!(
            align(&genotypes(), &shuffled).unwrap(),
            align(&genotypes(), &samples()).unwrap()
        );
    }

    #[test]
    fn test_partial_overlap_keeps_intersection() {
        // S2 unlabeled, S9 has no genotypes
        let samples: Vec<Row> = vec![
            vec!["S9".into(), 1.into()],
            vec!["S4".into(), 1.into()],
            vec!["S1".into(), 0.into()],
            vec!["S3".into(), 0.into()],
        ];

        let dataset = align(&genotypes(), &samples).unwrap();

        assert_eq!(dataset.samples(), &[Cell::from("S1"), "S3".into(), "S4".into()]);
        assert_eq!(
            dataset.rows()[0],
            vec![Cell::from(""), 0.into(), 0.into(), 1.into()]
        );
        assert_eq!(
            dataset.rows()[3],
            vec![Cell::from("c"), 0.into(), 0.into(), 2.into()]
        );
    }

    #[test]
    fn test_no_shared_samples() {
        let samples: Vec<Row> = vec![vec!["X".into(), 1.into()]];
        assert_eq!(
            align(&genotypes(), &samples),
            Err(AlignmentError::NoSharedSamples)
        );
    }

    #[test]
    fn test_short_row_is_an_error() {
        let mut genotypes = genotypes();
        genotypes[2].truncate(3);

        assert_eq!(
            align(&genotypes, &samples()),
            Err(AlignmentError::ShortGenotypeRow {
                row: 2,
                expected: 5,
                found: 3
            })
        );
    }

    #[test]
    fn test_numeric_ids_match_across_types() {
        let genotypes: Vec<Row> = vec![
            vec!["SNP".into(), 101.into(), 102.into()],
            vec!["a".into(), 1.into(), 2.into()],
        ];
        let samples: Vec<Row> = vec![vec![102.0.into(), 1.into()], vec![101.0.into(), 0.into()]];

        let dataset = align(&genotypes, &samples).unwrap();
        assert_eq!(dataset.samples().len(), 2);
        assert_eq!(dataset.rows()[0], vec![Cell::from(""), 0.into(), 1.into()]);
    }
}
