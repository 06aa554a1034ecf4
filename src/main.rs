// ==============================================================================
// main.rs - BitEpi Bridge Entry Point
// ==============================================================================
// Description: Command-line driver: loads genotype and sample tables, runs
//              one epistasis computation and reports the result tables
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bitepi_bridge::cleanup;
use bitepi_bridge::models::{DEFAULT_ENGINE, DEFAULT_EXIT_TIMEOUT};
use bitepi_bridge::output::{self, RunReport};
use bitepi_bridge::parsers::DelimitedTableReader;
use bitepi_bridge::{ComputeOptions, EpistasisSession, SessionConfig, Thresholds};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Genotype table (CSV/TSV, optionally .gz); first row names the samples
    #[arg(short, long)]
    genotypes: PathBuf,

    /// Sample table of `id,label` rows (CSV/TSV, optionally .gz)
    #[arg(short, long)]
    samples: PathBuf,

    /// Skip the first line of the sample table
    #[arg(long)]
    samples_header: bool,

    /// BitEpi executable
    #[arg(long, env = "BITEPI_ENGINE", default_value = DEFAULT_ENGINE)]
    engine: PathBuf,

    /// Directory for the interchange file and engine outputs
    #[arg(short, long, env = "BITEPI_WORKDIR")]
    working_dir: Option<PathBuf>,

    /// Fail when the tables do not list the same samples
    #[arg(long)]
    strict: bool,

    /// Purity threshold, 1-SNP (-1 computes without recording)
    #[arg(long, allow_negative_numbers = true)]
    p1: Option<f64>,

    /// Purity threshold, SNP pairs
    #[arg(long, allow_negative_numbers = true)]
    p2: Option<f64>,

    /// Purity threshold, SNP triplets
    #[arg(long, allow_negative_numbers = true)]
    p3: Option<f64>,

    /// Purity threshold, SNP quadlets
    #[arg(long, allow_negative_numbers = true)]
    p4: Option<f64>,

    /// Information gain threshold, 1-SNP (-1 computes without recording)
    #[arg(long, allow_negative_numbers = true)]
    ig1: Option<f64>,

    /// Information gain threshold, SNP pairs
    #[arg(long, allow_negative_numbers = true)]
    ig2: Option<f64>,

    /// Information gain threshold, SNP triplets
    #[arg(long, allow_negative_numbers = true)]
    ig3: Option<f64>,

    /// Information gain threshold, SNP quadlets
    #[arg(long, allow_negative_numbers = true)]
    ig4: Option<f64>,

    /// Engine worker threads
    #[arg(short, long, default_value_t = 2.0)]
    threads: f64,

    /// Sort each table from highest to lowest score
    #[arg(long)]
    sort: bool,

    /// Report the best pair/triplet/quadlet per SNP (ignores thresholds)
    #[arg(long)]
    best_ig: bool,

    /// Seconds to wait for the engine to exit after it closes its output
    #[arg(long, default_value_t = DEFAULT_EXIT_TIMEOUT.as_secs_f64())]
    exit_timeout: f64,

    /// Write a JSON run report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Copy each result table to <DIR>/<key>.csv
    #[arg(long)]
    tables_dir: Option<PathBuf>,

    /// Remove the interchange file and engine outputs when done
    #[arg(long)]
    cleanup: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bitepi_bridge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let exit_timeout = Duration::try_from_secs_f64(args.exit_timeout)
        .context("--exit-timeout must be a non-negative number of seconds")?;

    // Load input tables
    let reader = DelimitedTableReader::default();
    let genotypes = reader
        .read_genotypes(&args.genotypes)
        .with_context(|| format!("Failed to load genotype table {:?}", args.genotypes))?;
    let samples = reader
        .read_samples(&args.samples, args.samples_header)
        .with_context(|| format!("Failed to load sample table {:?}", args.samples))?;

    let mut config = SessionConfig {
        strict_intersect: args.strict,
        engine: args.engine,
        exit_timeout,
        ..Default::default()
    };
    if let Some(dir) = args.working_dir {
        config.working_directory = dir;
    }

    let session = EpistasisSession::new(genotypes, samples, config)
        .context("Failed to prepare engine input")?;

    let options = ComputeOptions {
        thresholds: Thresholds {
            p1: args.p1,
            p2: args.p2,
            p3: args.p3,
            p4: args.p4,
            ig1: args.ig1,
            ig2: args.ig2,
            ig3: args.ig3,
            ig4: args.ig4,
        },
        threads: args.threads,
        sort: args.sort,
        best_ig: args.best_ig,
    };

    let run = session.compute(&options).context("Engine computation failed")?;

    if run.results.is_empty() {
        warn!("No result tables requested; pass a threshold or --best-ig");
    }
    for (key, table) in run.results.iter() {
        println!("{:<8} {:>10} rows", key, table.len());
    }

    if let Some(path) = &args.report {
        output::write_json_report(path, &RunReport::new(&session, &options, &run))?;
    }
    if let Some(dir) = &args.tables_dir {
        output::write_tables(dir, &run.results)?;
    }

    if args.cleanup {
        cleanup::remove_run_outputs(&session.config().working_directory, &run.request.prefix_token)?;
        cleanup::remove_interchange(session.interchange_path())?;
    }

    info!("Done");
    Ok(())
}
