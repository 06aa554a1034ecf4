// ==============================================================================
// processor.rs - Epistasis Session Orchestration
// ==============================================================================
// Description: Prepares validated, aligned input once and runs the engine
//              against it any number of times
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================
// Pipeline:
//   new():     normalize -> validate -> align -> write interchange CSV
//   compute(): build invocation -> run engine -> ingest outputs
// ==============================================================================

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, info_span, Span};

use crate::aligner::{align, AlignedDataset, AlignmentError};
use crate::ids::{IdGenerator, UuidIds};
use crate::ingest::{ingest, IngestError, ResultSet};
use crate::input::{normalize, HeaderMode, NormalizeError, TableInput};
use crate::interchange::write_interchange;
use crate::invocation::{InvocationBuilder, InvocationRequest, ParameterError};
use crate::models::{ComputeOptions, SessionConfig};
use crate::runner::{ProcessRunner, RunSummary, RunnerError};
use crate::validator::{TableValidator, ValidationError};

/// Any failure of a session, from input preparation to result ingestion
#[derive(Error, Debug)]
pub enum EpistasisError {
    #[error("Input table has an invalid shape: {0}")]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    #[error("Failed to write interchange file: {0}")]
    Interchange(#[from] std::io::Error),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Outcome of one successful engine computation
#[derive(Debug, Clone)]
pub struct EpistasisRun {
    pub request: InvocationRequest,
    pub summary: RunSummary,
    pub results: ResultSet,
}

/// A prepared genotype/sample pairing bound to one engine and working directory
pub struct EpistasisSession {
    config: SessionConfig,
    ids: Box<dyn IdGenerator>,
    dataset: AlignedDataset,
    interchange_path: PathBuf,
    span: Span,
}

impl std::fmt::Debug for EpistasisSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpistasisSession")
            .field("config", &self.config)
            .field("interchange_path", &self.interchange_path)
            .field("samples", &self.dataset.samples().len())
            .field("variants", &self.dataset.num_variants())
            .finish()
    }
}

impl EpistasisSession {
    /// Prepare a session with random (UUID v4) file names
    pub fn new(
        genotypes: impl Into<TableInput>,
        samples: impl Into<TableInput>,
        config: SessionConfig,
    ) -> Result<Self, EpistasisError> {
        Self::with_id_generator(genotypes, samples, config, Box::new(UuidIds))
    }

    /// Prepare a session drawing file names from `ids`.
    ///
    /// Fails before touching the filesystem if either table is malformed.
    pub fn with_id_generator(
        genotypes: impl Into<TableInput>,
        samples: impl Into<TableInput>,
        config: SessionConfig,
        ids: Box<dyn IdGenerator>,
    ) -> Result<Self, EpistasisError> {
        let span = info_span!(
            "epistasis_session",
            working_dir = %config.working_directory.display()
        );
        let _entered = span.enter();

        // 1. Canonical rows
        let genotypes = normalize(genotypes.into(), HeaderMode::Include)?;
        let samples = normalize(samples.into(), HeaderMode::Omit)?;

        // 2. Schema, domains and sample overlap
        TableValidator::new(config.strict_intersect).validate(&genotypes, &samples)?;

        // 3. Intersection in genotype-header order
        let dataset = align(&genotypes, &samples)?;
        info!(
            "Aligned {} samples across {} variants",
            dataset.samples().len(),
            dataset.num_variants()
        );

        // 4. Engine input file
        let interchange_path = write_interchange(&dataset, &config.working_directory, ids.as_ref())?;
        info!("Wrote interchange file {:?}", interchange_path);

        drop(_entered);
        Ok(Self {
            config,
            ids,
            dataset,
            interchange_path,
            span,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn dataset(&self) -> &AlignedDataset {
        &self.dataset
    }

    /// Engine input file; left in place for the caller to remove
    pub fn interchange_path(&self) -> &Path {
        &self.interchange_path
    }

    /// Run the engine once and collect every table it wrote.
    ///
    /// Each call uses a fresh output prefix, so earlier runs' files are never
    /// read back. Parameter errors are raised before the engine is spawned.
    pub fn compute(&self, options: &ComputeOptions) -> Result<EpistasisRun, EpistasisError> {
        let _session = self.span.enter();

        let builder = InvocationBuilder::new(&self.config.engine, &self.config.working_directory);
        let request = builder.build(&self.interchange_path, options, self.ids.as_ref())?;

        let compute_span = info_span!("compute_epistasis", prefix = %request.prefix_token);
        let _compute = compute_span.enter();

        let mut runner = ProcessRunner::new(self.config.exit_timeout);
        let summary = runner.run(&request)?;

        let results = ingest(
            &self.config.working_directory,
            &request.prefix_token,
            &options.expected_keys(),
        )?;

        Ok(EpistasisRun {
            request,
            summary,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::testing::SequentialIds;
    use crate::input::{Column, ColumnValues, ColumnarArray, LabeledTable};
    use crate::models::{Cell, Row};
    use tempfile::tempdir;

    fn genotype_rows() -> Vec<Row> {
        vec![
            vec!["SNP".into(), "S1".into(), "S2".into(), "S3".into(), "S4".into()],
            vec!["a".into(), 0.into(), 1.into(), 2.into(), 0.into()],
            vec!["b".into(), 1.into(), 1.into(), 0.into(), 2.into()],
            vec!["c".into(), 2.into(), 0.into(), 0.into(), 1.into()],
        ]
    }

    fn sample_rows() -> Vec<Row> {
        vec![
            vec!["S4".into(), 1.into()],
            vec!["S2".into(), 0.into()],
            vec!["S1".into(), 1.into()],
            vec!["S3".into(), 0.into()],
        ]
    }

    fn config(dir: &Path) -> SessionConfig {
        SessionConfig {
            working_directory: dir.to_path_buf(),
            ..Default::default()
        }
    }

    fn session(dir: &Path, genotypes: impl Into<TableInput>) -> EpistasisSession {
        EpistasisSession::with_id_generator(
            genotypes,
            sample_rows(),
            config(dir),
            Box::new(SequentialIds::new("input")),
        )
        .unwrap()
    }

    #[test]
    fn test_representations_give_identical_interchange() {
        let from_rows = tempdir().unwrap();
        let from_columns = tempdir().unwrap();
        let from_labels = tempdir().unwrap();

        let columnar = ColumnarArray {
            columns: vec![
                Column::new("SNP", ColumnValues::Text(vec!["a".into(), "b".into(), "c".into()])),
                Column::new("S1", ColumnValues::UInt8(vec![0, 1, 2])),
                Column::new("S2", ColumnValues::UInt8(vec![1, 1, 0])),
                Column::new("S3", ColumnValues::Int(vec![2, 0, 0])),
                Column::new("S4", ColumnValues::Int(vec![0, 2, 1])),
            ],
        };
        let labeled = LabeledTable {
            columns: vec!["SNP".into(), "S1".into(), "S2".into(), "S3".into(), "S4".into()],
            values: genotype_rows()[1..].to_vec(),
        };

        let sessions = [
            session(from_rows.path(), genotype_rows()),
            session(from_columns.path(), columnar),
            session(from_labels.path(), labeled),
        ];

        let contents: Vec<String> = sessions
            .iter()
            .map(|s| std::fs::read_to_string(s.interchange_path()).unwrap())
            .collect();

        assert_eq!(contents[0], ",1,0,0,1\na,0,1,2,0\nb,1,1,0,2\nc,2,0,0,1\n");
        assert_eq!(contents[0], contents[1]);
        assert_eq!(contents[0], contents[2]);
    }

    #[test]
    fn test_invalid_input_writes_nothing() {
        let dir = tempdir().unwrap();
        let mut genotypes = genotype_rows();
        genotypes[2][3] = Cell::Int(3);

        let result = EpistasisSession::new(genotypes, sample_rows(), config(dir.path()));

        assert!(matches!(
            result,
            Err(EpistasisError::Validation(ValidationError::InvalidGenotype { .. }))
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_ragged_input_is_rejected() {
        let dir = tempdir().unwrap();
        let columnar = ColumnarArray {
            columns: vec![
                Column::new("SNP", ColumnValues::Text(vec!["a".into(), "b".into()])),
                Column::new("S1", ColumnValues::UInt8(vec![0])),
            ],
        };

        let result = EpistasisSession::new(columnar, sample_rows(), config(dir.path()));
        assert!(matches!(result, Err(EpistasisError::Normalize(_))));
    }

    #[test]
    fn test_strict_mode_rejects_partial_overlap() {
        let dir = tempdir().unwrap();
        let mut samples = sample_rows();
        samples.pop();

        let strict = SessionConfig {
            strict_intersect: true,
            ..config(dir.path())
        };
        let result = EpistasisSession::new(genotype_rows(), samples.clone(), strict);
        assert!(matches!(
            result,
            Err(EpistasisError::Validation(ValidationError::MissingFromSampleTable { count: 1 }))
        ));

        // Non-strict mode keeps the intersection
        let session = EpistasisSession::new(genotype_rows(), samples, config(dir.path())).unwrap();
        assert_eq!(session.dataset().samples().len(), 3);
    }

    #[test]
    fn test_parameter_error_precedes_spawn() {
        let dir = tempdir().unwrap();
        let mut config = config(dir.path());
        config.engine = dir.path().join("no-such-engine");
        let session = EpistasisSession::new(genotype_rows(), sample_rows(), config).unwrap();

        let options = ComputeOptions {
            threads: 2.5,
            ..Default::default()
        };
        assert!(matches!(
            session.compute(&options),
            Err(EpistasisError::Parameter(ParameterError::InvalidThreads(_)))
        ));
    }

    #[cfg(unix)]
    mod engine {
        use super::*;
        use crate::models::{ResultKey, Thresholds};
        use crate::runner::testing::fake_engine;

        /// Stand-in honouring the engine's flags and output naming
        const SCRIPT: &str = r#"
while [ $# -gt 0 ]; do
  case "$1" in
    -i) input="$2"; shift ;;
    -o) out="$2"; shift ;;
    -bestIG) best=1 ;;
    -p1) case "$2" in -*|"") ;; *) p1=1; shift ;; esac ;;
    -ig2) case "$2" in -*|"") ;; *) ig2=1; shift ;; esac ;;
  esac
  shift
done
echo "Reading $input"
if [ -n "$best" ]; then
  echo "SNP,SNP_P,PAIR_P,TRIPLET_P,QUADLET_P,SNP_IG,PAIR_IG,TRIPLET_IG,QUADLET_IG,PAIR,TRIPLET_1,TRIPLET_2,QUADLET_1,QUADLET_2,QUADLET_3" > "$out.bestIG.csv"
  tail -n +2 "$input" | cut -d, -f1 | while read v; do
    echo "$v,0.5,0.5,0.5,0.5,0.1,0.2,0.3,0.4,x,x,x,x,x,x" >> "$out.bestIG.csv"
  done
  exit 0
fi
if [ -n "$p1" ]; then
  echo "Purity,SNP_A" > "$out.Purity.0.csv"
  tail -n +2 "$input" | cut -d, -f1 | while read v; do echo "0.5,$v" >> "$out.Purity.0.csv"; done
fi
if [ -n "$ig2" ]; then
  printf 'IG,SNP_A,SNP_B\n0.25,a,b\n' > "$out.IG.1.csv"
fi
"#;

        fn engine_session(work: &Path, engine_dir: &Path) -> EpistasisSession {
            let config = SessionConfig {
                working_directory: work.to_path_buf(),
                engine: fake_engine(engine_dir, SCRIPT),
                ..Default::default()
            };
            EpistasisSession::new(genotype_rows(), sample_rows(), config).unwrap()
        }

        #[test]
        fn test_best_ig_run() {
            let work = tempdir().unwrap();
            let engine_dir = tempdir().unwrap();
            let session = engine_session(work.path(), engine_dir.path());

            let run = session
                .compute(&ComputeOptions {
                    best_ig: true,
                    ..Default::default()
                })
                .unwrap();

            assert_eq!(run.results.keys().collect::<Vec<_>>(), vec![ResultKey::BestIg]);
            let table = run.results.get(ResultKey::BestIg).unwrap();
            assert_eq!(table.column("SNP").unwrap(), vec!["a", "b", "c"]);
            assert_eq!(table.headers.len(), 15);
            assert!(run.summary.output_lines >= 1);
        }

        #[test]
        fn test_sorted_best_ig_run_with_thresholds() {
            let work = tempdir().unwrap();
            let engine_dir = tempdir().unwrap();
            let genotypes: Vec<Row> = vec![
                vec!["SNP".into(), "S1".into(), "S2".into(), "S3".into(), "S4".into()],
                vec!["a".into(), 1.into(), 2.into(), 0.into(), 0.into()],
                vec!["b".into(), 1.into(), 1.into(), 1.into(), 1.into()],
                vec!["c".into(), 0.into(), 1.into(), 0.into(), 2.into()],
            ];
            let samples: Vec<Row> = vec![
                vec!["S3".into(), 0.into()],
                vec!["S1".into(), 0.into()],
                vec!["S4".into(), 0.into()],
                vec!["S2".into(), 1.into()],
            ];
            let config = SessionConfig {
                working_directory: work.path().to_path_buf(),
                engine: fake_engine(engine_dir.path(), SCRIPT),
                ..Default::default()
            };
            let session = EpistasisSession::new(genotypes, samples, config).unwrap();

            assert_eq!(
                std::fs::read_to_string(session.interchange_path()).unwrap(),
                ",0,1,0,0\na,1,2,0,0\nb,1,1,1,1\nc,0,1,0,2\n"
            );

            let options = ComputeOptions {
                thresholds: Thresholds {
                    p1: Some(0.0),
                    ig2: Some(0.0),
                    ..Default::default()
                },
                threads: 2.0,
                sort: true,
                best_ig: true,
            };
            let run = session.compute(&options).unwrap();

            let command = run.request.command_line();
            assert!(command.contains(" -p1 0 -ig2 0 -i "));
            assert!(command.ends_with(&format!(
                "-o {} -t 2 -sort -bestIG",
                run.request.output_prefix.display()
            )));

            assert_eq!(run.results.keys().collect::<Vec<_>>(), vec![ResultKey::BestIg]);
            let table = run.results.get(ResultKey::BestIg).unwrap();
            assert_eq!(table.column("SNP").unwrap(), vec!["a", "b", "c"]);
        }

        #[test]
        fn test_threshold_run_collects_each_table() {
            let work = tempdir().unwrap();
            let engine_dir = tempdir().unwrap();
            let session = engine_session(work.path(), engine_dir.path());

            let options = ComputeOptions {
                thresholds: Thresholds {
                    p1: Some(0.0),
                    p2: Some(-1.0),
                    ig2: Some(0.0),
                    ..Default::default()
                },
                ..Default::default()
            };
            let run = session.compute(&options).unwrap();

            assert_eq!(
                run.results.keys().collect::<Vec<_>>(),
                vec![ResultKey::P1, ResultKey::Ig2]
            );
            assert_eq!(run.results.get(ResultKey::P1).unwrap().len(), 3);
            assert_eq!(
                run.results.get(ResultKey::Ig2).unwrap().numeric_column("IG").unwrap(),
                vec![0.25]
            );
        }

        #[test]
        fn test_repeated_runs_use_fresh_prefixes() {
            let work = tempdir().unwrap();
            let engine_dir = tempdir().unwrap();
            let session = engine_session(work.path(), engine_dir.path());
            let options = ComputeOptions {
                best_ig: true,
                ..Default::default()
            };

            let first = session.compute(&options).unwrap();
            let second = session.compute(&options).unwrap();

            assert_ne!(first.request.prefix_token, second.request.prefix_token);
            assert_eq!(second.results.len(), 1);
        }

        #[test]
        fn test_missing_output_is_an_error() {
            let work = tempdir().unwrap();
            let engine_dir = tempdir().unwrap();
            let session = engine_session(work.path(), engine_dir.path());

            // The stand-in never writes the p3 table
            let options = ComputeOptions {
                thresholds: Thresholds {
                    p3: Some(0.1),
                    ..Default::default()
                },
                ..Default::default()
            };
            assert!(matches!(
                session.compute(&options),
                Err(EpistasisError::Ingest(IngestError::MissingOutput { key: ResultKey::P3 }))
            ));
        }

        #[test]
        fn test_engine_failure_is_reported() {
            let work = tempdir().unwrap();
            let engine_dir = tempdir().unwrap();
            let config = SessionConfig {
                working_directory: work.path().to_path_buf(),
                engine: fake_engine(engine_dir.path(), "echo '***ERR*** bad input' >&2\nexit 1"),
                ..Default::default()
            };
            let session = EpistasisSession::new(genotype_rows(), sample_rows(), config).unwrap();

            assert!(matches!(
                session.compute(&ComputeOptions::default()),
                Err(EpistasisError::Runner(RunnerError::NonZeroExit { code: 1 }))
            ));
        }
    }
}
