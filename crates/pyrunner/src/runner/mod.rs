//! Execution orchestration for pyrunner
//!
//! Provides the high-level API that turns an execution request into a
//! complete report: analysis, policy check, per-input runs and accounting.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, instrument, warn};

pub use crate::runner::execute::execute_runs;

mod execute;

use crate::{
    accounting::{self, round2},
    analyzer,
    config::Config,
    policy::Denylist,
    types::{ComplexityVerdict, ExecutionReport, Inputs, RunResult, SpaceBucket},
};

/// Errors that reject a request before anything runs
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No code provided")]
    MissingCode,
}

/// A validated request: non-blank code plus the ordered input values
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    code: String,
    inputs: Vec<String>,
}

impl ExecutionRequest {
    /// Validate raw request parts
    ///
    /// Absent or whitespace-only code is rejected.
    pub fn new(code: Option<String>, inputs: Inputs) -> Result<Self, ValidationError> {
        let code = code
            .filter(|code| !code.trim().is_empty())
            .ok_or(ValidationError::MissingCode)?;
        Ok(Self {
            code,
            inputs: inputs.into_values(),
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }
}

/// High-level runner for snippet execution
///
/// Holds no per-request state; one runner can serve any number of concurrent
/// requests.
#[derive(Debug, Clone)]
pub struct Runner {
    config: Config,
    denylist: Denylist,
}

impl Runner {
    /// Create a new runner with the given configuration
    pub fn new(config: Config) -> Self {
        let denylist = config.denylist();
        Self { config, denylist }
    }

    /// Create a new runner with default configuration
    pub fn with_defaults() -> Self {
        Self::new(Config::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Classify a snippet without running it
    pub fn analyze(&self, code: &str) -> ComplexityVerdict {
        analyzer::classify(code)
    }

    /// Execute a request and build its report
    ///
    /// Never fails: every error ends up in the report's `error` field.
    #[instrument(skip_all, fields(code_len = request.code().len(), inputs = request.inputs().len()))]
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionReport {
        let verdict = analyzer::classify(request.code());
        debug!(?verdict, "classified snippet");

        if let Err(e) = self.denylist.check(request.code()) {
            return ExecutionReport::failure(format!("Error: {e}"), verdict);
        }

        let (runs, measurement) = accounting::measure(execute_runs(
            &self.config,
            request.code(),
            request.inputs(),
        ))
        .await;

        let runs = match runs {
            Ok(runs) => runs,
            Err(e) => {
                warn!(error = %e, "execution failed");
                return ExecutionReport::failure(format!("Error: {e}"), verdict);
            }
        };

        let mut elapsed = measurement.elapsed;
        if runs.iter().any(RunResult::timed_out) {
            elapsed = elapsed.max(self.config.deadline());
        }

        let memory_mb = round2(measurement.memory_delta_mb());
        self.assemble(
            &runs,
            verdict,
            elapsed,
            memory_mb,
            request.inputs().to_vec(),
        )
    }

    fn assemble(
        &self,
        runs: &[RunResult],
        verdict: ComplexityVerdict,
        elapsed: Duration,
        memory_mb: f64,
        inputs_used: Vec<String>,
    ) -> ExecutionReport {
        let output = runs
            .iter()
            .map(|run| run.stdout.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let error = runs
            .iter()
            .map(|run| run.stderr.trim_end())
            .filter(|stderr| !stderr.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        ExecutionReport {
            output,
            error,
            execution_time_seconds: elapsed.as_secs_f64(),
            time_complexity: verdict,
            space_complexity: SpaceBucket::describe(memory_mb),
            memory_usage_mb: memory_mb,
            inputs_used,
        }
    }
}
