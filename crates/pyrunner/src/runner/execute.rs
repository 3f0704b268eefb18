//! Per-input execution
//!
//! Frames the snippet once per input value and runs each framed program in
//! the sandbox. Results always come back in input order.

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, instrument};

use crate::config::Config;
use crate::sandbox::{self, SandboxError, frame};
use crate::types::RunResult;

/// Run `code` once per input, or once without input if `inputs` is empty
///
/// At most `config.max_parallel_runs` runs are in flight at a time. The first
/// sandbox failure aborts the remaining runs; a timed-out run is a result,
/// not a failure, and does not stop the others.
#[instrument(skip(config, code, inputs), fields(runs = inputs.len().max(1)))]
pub async fn execute_runs(
    config: &Config,
    code: &str,
    inputs: &[String],
) -> Result<Vec<RunResult>, SandboxError> {
    if inputs.is_empty() {
        let result = sandbox::run(config, &frame(code, None)).await?;
        return Ok(vec![result]);
    }

    let parallelism = config.max_parallel_runs.max(1);
    debug!(parallelism, "running inputs");

    let programs: Vec<String> = inputs
        .iter()
        .map(|input| frame(code, Some(input.as_str())))
        .collect();

    stream::iter(programs)
        .map(|program| async move { sandbox::run(config, &program).await })
        .buffered(parallelism)
        .try_collect()
        .await
}
