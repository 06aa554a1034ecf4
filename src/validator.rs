// ==============================================================================
// validator.rs - Genotype and Sample Table Validation
// ==============================================================================
// Description: Schema, value-domain and cross-table checks run before any
//              file or process is created
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================

use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Cell, Row};

/// Allowed genotype codes: homozygous reference, heterozygous, homozygous alternate
pub const GENOTYPE_CODES: [i64; 3] = [0, 1, 2];

/// Allowed sample labels: control, case
pub const LABEL_CODES: [i64; 2] = [0, 1];

/// Errors that identify the first table constraint found to be violated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("sample array must contain at least one row")]
    EmptySampleTable,

    #[error("sample array rows must each contain two elements (row {row} has {found})")]
    SampleRowWidth { row: usize, found: usize },

    #[error("First element of each row in sample array must be unique ('{sample}' repeats)")]
    DuplicateSample { sample: String },

    #[error("Second element of each row in sample array must be 0 or 1 (row {row} has '{value}')")]
    InvalidLabel { row: usize, value: String },

    #[error("genotype array must contain at least one row")]
    EmptyGenotypeTable,

    #[error("genotype array rows must each contain more than one element (row {row} has {found})")]
    GenotypeRowTooNarrow { row: usize, found: usize },

    #[error("genotype array row {row} has {found} elements, header has {expected}")]
    GenotypeRowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Each element in the first row of genotype array must be unique ('{sample}' repeats)")]
    DuplicateGenotypeSample { sample: String },

    #[error("First element of each row in genotype array must be unique ('{variant}' repeats)")]
    DuplicateVariant { variant: String },

    #[error(
        "All elements except those in the first row and column of genotype array must be 0, 1 or 2 \
         (row {row}, column {column} has '{value}')"
    )]
    InvalidGenotype {
        row: usize,
        column: usize,
        value: String,
    },

    #[error("{count} samples from genotype array are missing in sample array")]
    MissingFromSampleTable { count: usize },

    #[error("{count} samples from sample array are missing in genotype array")]
    MissingFromGenotypeTable { count: usize },
}

/// Validator for a normalized genotype table and sample table
#[derive(Debug, Clone, Copy, Default)]
pub struct TableValidator {
    /// Treat samples present in only one table as an error
    pub strict_intersect: bool,
}

impl TableValidator {
    pub fn new(strict_intersect: bool) -> Self {
        Self { strict_intersect }
    }

    /// Run every check against both tables, reporting the first violation
    pub fn validate(&self, genotypes: &[Row], samples: &[Row]) -> Result<(), ValidationError> {
        debug!(
            "Validating {} genotype rows and {} sample rows",
            genotypes.len(),
            samples.len()
        );

        let sample_ids = self.validate_samples(samples)?;
        let genotype_ids = self.validate_genotypes(genotypes)?;
        self.validate_overlap(&sample_ids, &genotype_ids)?;

        debug!("Validation passed");
        Ok(())
    }

    fn validate_samples<'a>(&self, samples: &'a [Row]) -> Result<HashSet<&'a Cell>, ValidationError> {
        if samples.is_empty() {
            return Err(ValidationError::EmptySampleTable);
        }

        if let Some((row, fields)) = samples.iter().enumerate().find(|(_, r)| r.len() != 2) {
            return Err(ValidationError::SampleRowWidth {
                row,
                found: fields.len(),
            });
        }

        let mut ids = HashSet::with_capacity(samples.len());
        for row in samples {
            if !ids.insert(&row[0]) {
                return Err(ValidationError::DuplicateSample {
                    sample: row[0].to_string(),
                });
            }
        }

        if let Some((row, fields)) = samples
            .iter()
            .enumerate()
            .find(|(_, r)| !r[1].is_one_of(&LABEL_CODES))
        {
            return Err(ValidationError::InvalidLabel {
                row,
                value: fields[1].to_string(),
            });
        }

        Ok(ids)
    }

    fn validate_genotypes<'a>(&self, genotypes: &'a [Row]) -> Result<HashSet<&'a Cell>, ValidationError> {
        let header = genotypes.first().ok_or(ValidationError::EmptyGenotypeTable)?;
        let width = header.len();

        for (row, fields) in genotypes.iter().enumerate() {
            if fields.len() <= 1 {
                return Err(ValidationError::GenotypeRowTooNarrow {
                    row,
                    found: fields.len(),
                });
            }
            if fields.len() != width {
                return Err(ValidationError::GenotypeRowWidth {
                    row,
                    expected: width,
                    found: fields.len(),
                });
            }
        }

        let mut sample_ids = HashSet::with_capacity(width - 1);
        for sample in &header[1..] {
            if !sample_ids.insert(sample) {
                return Err(ValidationError::DuplicateGenotypeSample {
                    sample: sample.to_string(),
                });
            }
        }

        // The header's first cell takes part: it shares the identifier column
        let mut variant_ids = HashSet::with_capacity(genotypes.len());
        for fields in genotypes {
            if !variant_ids.insert(&fields[0]) {
                return Err(ValidationError::DuplicateVariant {
                    variant: fields[0].to_string(),
                });
            }
        }

        for (row, fields) in genotypes.iter().enumerate().skip(1) {
            if let Some((column, value)) = fields
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, v)| !v.is_one_of(&GENOTYPE_CODES))
            {
                return Err(ValidationError::InvalidGenotype {
                    row,
                    column,
                    value: value.to_string(),
                });
            }
        }

        Ok(sample_ids)
    }

    fn validate_overlap(
        &self,
        sample_ids: &HashSet<&Cell>,
        genotype_ids: &HashSet<&Cell>,
    ) -> Result<(), ValidationError> {
        let shared = sample_ids.intersection(genotype_ids).count();
        let missing_from_samples = genotype_ids.len() - shared;
        let missing_from_genotypes = sample_ids.len() - shared;

        if missing_from_samples > 0 {
            let err = ValidationError::MissingFromSampleTable {
                count: missing_from_samples,
            };
            if self.strict_intersect {
                return Err(err);
            }
            warn!("{}", err);
        }

        if missing_from_genotypes > 0 {
            let err = ValidationError::MissingFromGenotypeTable {
                count: missing_from_genotypes,
            };
            if self.strict_intersect {
                return Err(err);
            }
            warn!("{}", err);
        }

        Ok(())
    }
}
