// ==============================================================================
// runner.rs - Engine Process Lifecycle
// ==============================================================================
// Description: Spawns the engine, streams its merged output into the log,
//              bounds the exit wait and classifies the exit status
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================
// States:
//   Created -> Running -> Completed | TimedOut | NonZeroExit | Terminated
// The exit wait starts only once the engine closes its output stream; an
// engine that stalls with the stream open is not bounded. A timed-out engine
// is not killed.
// ==============================================================================

use std::io::{self, BufRead, BufReader, PipeReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::invocation::InvocationRequest;
use crate::models::DEFAULT_EXIT_TIMEOUT;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Errors from a single engine invocation
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to create engine output pipe: {0}")]
    Pipe(#[source] io::Error),

    #[error("Failed to spawn engine {engine:?}: {source}")]
    Spawn {
        engine: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read engine output: {0}")]
    Output(#[source] io::Error),

    #[error("Failed to query engine exit status: {0}")]
    Wait(#[source] io::Error),

    #[error("Engine did not exit within {timeout:?} of closing its output")]
    TimedOut { timeout: Duration },

    #[error("Engine returned non-zero error code {code}")]
    NonZeroExit { code: i32 },

    #[error("Engine was terminated without an exit code")]
    Terminated,
}

/// Lifecycle state of the engine process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Created,
    Running,
    Completed,
    TimedOut,
    NonZeroExit(i32),
    Terminated,
}

/// Statistics of a successful run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub output_lines: usize,
    pub elapsed: Duration,
}

/// Runs one engine invocation; a new runner is used per call
#[derive(Debug)]
pub struct ProcessRunner {
    exit_timeout: Duration,
    state: RunState,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_EXIT_TIMEOUT)
    }
}

impl ProcessRunner {
    pub fn new(exit_timeout: Duration) -> Self {
        Self {
            exit_timeout,
            state: RunState::Created,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Launch the engine and block until it has exited or timed out.
    ///
    /// Every line the engine writes to stdout or stderr is forwarded to the
    /// `bitepi_bridge::engine` log target at debug level.
    pub fn run(&mut self, request: &InvocationRequest) -> Result<RunSummary, RunnerError> {
        info!("Calling: {}", request.command_line());
        let started = Instant::now();

        let (mut child, output) = self.spawn(request)?;
        self.state = RunState::Running;

        let output_lines = drain(output).map_err(RunnerError::Output)?;

        let status = self.wait_bounded(&mut child)?;
        self.classify(status)?;

        let elapsed = started.elapsed();
        info!(
            "Engine finished in {:.2}s ({} output lines)",
            elapsed.as_secs_f64(),
            output_lines
        );

        Ok(RunSummary {
            output_lines,
            elapsed,
        })
    }

    fn spawn(&self, request: &InvocationRequest) -> Result<(Child, PipeReader), RunnerError> {
        // stdout and stderr share one pipe so the log keeps their interleaving
        let (reader, writer) = io::pipe().map_err(RunnerError::Pipe)?;
        let stderr = writer.try_clone().map_err(RunnerError::Pipe)?;

        let mut command = Command::new(&request.engine);
        command
            .args(request.args())
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr);

        let child = command.spawn().map_err(|source| RunnerError::Spawn {
            engine: request.engine.clone(),
            source,
        })?;

        // The command still owns our copies of the write end; the drain only
        // sees EOF once they are closed
        drop(command);

        Ok((child, reader))
    }

    fn wait_bounded(&mut self, child: &mut Child) -> Result<ExitStatus, RunnerError> {
        let deadline = Instant::now() + self.exit_timeout;

        loop {
            if let Some(status) = child.try_wait().map_err(RunnerError::Wait)? {
                return Ok(status);
            }

            let now = Instant::now();
            if now >= deadline {
                self.state = RunState::TimedOut;
                error!("Error when calling binary, binary is not responding.");
                return Err(RunnerError::TimedOut {
                    timeout: self.exit_timeout,
                });
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }

    fn classify(&mut self, status: ExitStatus) -> Result<(), RunnerError> {
        match status.code() {
            Some(0) => {
                self.state = RunState::Completed;
                Ok(())
            }
            Some(code) => {
                self.state = RunState::NonZeroExit(code);
                error!("Error when calling binary, got return-code {}.", code);
                Err(RunnerError::NonZeroExit { code })
            }
            None => {
                self.state = RunState::Terminated;
                error!("Error when calling binary, terminated by signal.");
                Err(RunnerError::Terminated)
            }
        }
    }
}

/// Forward every line of `output` to the log until the writer side closes
fn drain(output: impl Read) -> io::Result<usize> {
    let mut reader = BufReader::new(output);
    let mut line = Vec::new();
    let mut count = 0;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(count);
        }
        count += 1;

        let text = String::from_utf8_lossy(&line);
        debug!(target: "bitepi_bridge::engine", "{}", text.trim_end_matches(['\n', '\r']));
    }
}
