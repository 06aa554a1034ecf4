// ==============================================================================
// invocation.rs - Engine Command-Line Construction
// ==============================================================================
// Description: Translates computation options into the engine's argument
//              contract and allocates a unique output prefix
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================
// Contract:
//   <engine> [-p1 v|-p1] ... [-ig4 v|-ig4] -i <csv> -o <prefix> -t <n> [-sort] [-bestIG]
// A threshold flag without a value computes the metric without recording it.
// ==============================================================================

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::error;

use crate::ids::IdGenerator;
use crate::models::{ComputeOptions, BENCHMARK_ONLY};

/// Errors in computation parameters, raised before any process is spawned
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error(
        "Thresholds (p/ig1-4) must be in the range [0, 1), or -1 for benchmarking. {name} is {value}."
    )]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    #[error("threads must be a positive integer, got {0}")]
    InvalidThreads(f64),
}

/// A fully specified engine call
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub engine: PathBuf,
    /// Encoded `-p*`/`-ig*` arguments, in contract order
    pub threshold_args: Vec<String>,
    pub input: PathBuf,
    /// Path prefix every output file of this call starts with
    pub output_prefix: PathBuf,
    /// File-name component of `output_prefix`
    pub prefix_token: String,
    pub threads: u32,
    pub sort: bool,
    pub best_ig: bool,
}

impl InvocationRequest {
    /// Arguments following the engine path
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.threshold_args.iter().map(OsString::from).collect();

        args.push("-i".into());
        args.push(self.input.clone().into_os_string());
        args.push("-o".into());
        args.push(self.output_prefix.clone().into_os_string());
        args.push("-t".into());
        args.push(self.threads.to_string().into());

        if self.sort {
            args.push("-sort".into());
        }
        if self.best_ig {
            args.push("-bestIG".into());
        }

        args
    }

    /// Space-joined command line, for logs and reports
    pub fn command_line(&self) -> String {
        std::iter::once(self.engine.as_os_str().to_string_lossy().into_owned())
            .chain(self.args().iter().map(|a| a.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Builds [`InvocationRequest`]s for one engine and working directory
#[derive(Debug, Clone)]
pub struct InvocationBuilder {
    engine: PathBuf,
    working_dir: PathBuf,
}

impl InvocationBuilder {
    pub fn new(engine: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine: engine.into(),
            working_dir: working_dir.into(),
        }
    }

    pub fn build(
        &self,
        input: &Path,
        options: &ComputeOptions,
        ids: &dyn IdGenerator,
    ) -> Result<InvocationRequest, ParameterError> {
        let threads = validate_threads(options.threads)?;
        let threshold_args = encode_thresholds(options)?;

        let prefix_token = ids.next_id();
        let output_prefix = self.working_dir.join(&prefix_token);

        Ok(InvocationRequest {
            engine: self.engine.clone(),
            threshold_args,
            input: input.to_path_buf(),
            output_prefix,
            prefix_token,
            threads,
            sort: options.sort,
            best_ig: options.best_ig,
        })
    }
}

fn validate_threads(threads: f64) -> Result<u32, ParameterError> {
    if !threads.is_finite() || threads.trunc() != threads || threads < 1.0 || threads > u32::MAX as f64 {
        error!("Got invalid argument threads={}", threads);
        return Err(ParameterError::InvalidThreads(threads));
    }
    Ok(threads as u32)
}

fn encode_thresholds(options: &ComputeOptions) -> Result<Vec<String>, ParameterError> {
    let mut args = Vec::new();

    for (name, value, _) in options.thresholds.entries() {
        let Some(value) = value else { continue };
        let flag = format!("-{}", name);

        if value == BENCHMARK_ONLY {
            args.push(flag);
        } else if (0.0..1.0).contains(&value) {
            args.push(flag);
            args.push(value.to_string());
        } else {
            error!("Got invalid argument {}={}", name, value);
            return Err(ParameterError::ThresholdOutOfRange { name, value });
        }
    }

    Ok(args)
}
