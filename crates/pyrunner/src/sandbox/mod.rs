//! Isolated program runner
//!
//! Runs one framed program in a child interpreter process: the program is
//! written to a temporary file, executed in its own process group under a
//! wall-clock deadline, and its framed output is extracted.
//!
//! The process boundary is the only isolation used here. There is no
//! filesystem, network or syscall confinement.

use std::string::FromUtf8Error;

use thiserror::Error;
use tracing::{debug, instrument, warn};

pub use crate::sandbox::frame::{OUTPUT_BEGIN, OUTPUT_END, extract_output, frame};
pub use crate::sandbox::process::{ProcessGroup, ProcessOutcome, run_process};
pub use crate::sandbox::program::ProgramFile;
use crate::config::Config;
use crate::types::{RunResult, RunStatus};

mod frame;
mod process;
mod program;

/// Prefix of the note appended when a program file could not be removed
pub const CLEANUP_WARNING: &str = "Warning: failed to remove temporary program";

/// Errors that occur while running a program
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("failed to create temporary program: {0}")]
    ProgramFile(#[source] std::io::Error),

    #[error("run command is empty")]
    EmptyCommand,

    #[error("failed to launch '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed while waiting for program: {0}")]
    Wait(#[source] std::io::Error),

    #[error("program {stream} is not valid UTF-8: {source}")]
    Decode {
        stream: &'static str,
        #[source]
        source: FromUtf8Error,
    },

    /// A primary failure followed by a failure to remove the program file
    #[error("{source}\n{CLEANUP_WARNING}: {cleanup}")]
    CleanupAfter {
        #[source]
        source: Box<SandboxError>,
        cleanup: std::io::Error,
    },
}

/// Message reported in place of stderr when a run exceeds its deadline
pub fn timeout_message(time_limit: f64) -> String {
    format!("Code execution timed out ({time_limit} second limit)")
}

/// Run a framed program once
///
/// The temporary program file is removed on every path. A removal failure
/// never replaces the run's result: it is appended to stderr on success, or
/// attached to the primary error.
#[instrument(skip(config, program_text), fields(len = program_text.len()))]
pub async fn run(config: &Config, program_text: &str) -> Result<RunResult, SandboxError> {
    let program = ProgramFile::create(config.temp_dir.as_deref(), program_text).await?;

    let result = run_program(config, &program).await;

    match (result, program.close()) {
        (Ok(run), Ok(())) => Ok(run),
        (Ok(mut run), Err(cleanup)) => {
            warn!(error = %cleanup, "failed to remove program file");
            append_line(&mut run.stderr, &format!("{CLEANUP_WARNING}: {cleanup}"));
            Ok(run)
        }
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(cleanup)) => {
            warn!(error = %cleanup, "failed to remove program file");
            Err(SandboxError::CleanupAfter {
                source: Box::new(e),
                cleanup,
            })
        }
    }
}

async fn run_program(config: &Config, program: &ProgramFile) -> Result<RunResult, SandboxError> {
    let argv = config.expand_command(program.path());

    match run_process(&argv, &config.env, config.deadline()).await? {
        ProcessOutcome::Exited {
            status,
            stdout,
            stderr,
        } => {
            let stdout = String::from_utf8(stdout).map_err(|source| SandboxError::Decode {
                stream: "stdout",
                source,
            })?;
            let stderr = String::from_utf8(stderr).map_err(|source| SandboxError::Decode {
                stream: "stderr",
                source,
            })?;

            let captured = match extract_output(&stdout) {
                Some(captured) => captured.to_owned(),
                None => {
                    debug!("output markers missing, reporting empty output");
                    String::new()
                }
            };

            Ok(RunResult {
                status: RunStatus::Completed,
                stdout: captured,
                stderr,
                exit_code: status.code(),
            })
        }
        ProcessOutcome::TimedOut => Ok(RunResult {
            status: RunStatus::TimedOut,
            stdout: String::new(),
            stderr: timeout_message(config.time_limit),
            exit_code: None,
        }),
    }
}

fn append_line(text: &mut String, line: &str) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(line);
}
