//! Child process spawning and deadline enforcement
//!
//! Every program runs as the leader of its own process group so that it and
//! anything it spawns can be signalled as one unit.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::sandbox::SandboxError;

/// How a child process finished
#[derive(Debug)]
pub enum ProcessOutcome {
    /// The child exited and both pipes reached EOF before the deadline
    Exited {
        status: ExitStatus,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },

    /// The deadline expired; the process group was sent SIGTERM
    TimedOut,
}

/// Guard for a child's process group
///
/// While armed, dropping the guard terminates the whole group. This covers
/// runs abandoned mid-flight, e.g. when the caller's future is cancelled.
#[derive(Debug)]
pub struct ProcessGroup {
    pgid: Option<u32>,
}

impl ProcessGroup {
    pub fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    /// Stop guarding the group (the run finished normally)
    pub fn disarm(&mut self) {
        self.pgid = None;
    }

    /// Check if dropping the guard would signal the group
    pub fn is_armed(&self) -> bool {
        self.pgid.is_some()
    }

    /// Send SIGTERM to every process in the group and disarm
    ///
    /// Fire-and-forget: the group is not waited on.
    pub fn terminate(&mut self) {
        let Some(pgid) = self.pgid.take() else {
            return;
        };
        signal_group(pgid);
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid {
            warn!(pgid, "run abandoned before completion, terminating process group");
            self.terminate();
        }
    }
}

#[cfg(unix)]
fn signal_group(pgid: u32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pgid) else {
        warn!(pgid, "process group id out of range");
        return;
    };
    match killpg(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) => debug!(pgid, "sent SIGTERM to process group"),
        // ESRCH: the group is already gone
        Err(e) => debug!(pgid, error = %e, "failed to signal process group"),
    }
}

#[cfg(not(unix))]
fn signal_group(pgid: u32) {
    debug!(pgid, "process groups unsupported on this platform");
}

async fn read_stream<R>(stream: Option<R>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Run `argv` with piped output in a new process group, bounded by `deadline`
///
/// The deadline covers both the child's exit and draining its pipes, so a
/// descendant holding stdout open cannot stall the caller.
#[instrument(skip(env))]
pub async fn run_process<'a, I>(
    argv: &[String],
    env: I,
    deadline: Duration,
) -> Result<ProcessOutcome, SandboxError>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let (program, args) = argv.split_first().ok_or(SandboxError::EmptyCommand)?;

    let mut command = Command::new(program);
    command
        .args(args)
        .env("PYTHONIOENCODING", "utf-8")
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn().map_err(|source| SandboxError::SpawnFailed {
        program: program.clone(),
        source,
    })?;

    let mut group = ProcessGroup::new(child.id());
    debug!(pid = ?child.id(), "spawned program");

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let collected = tokio::time::timeout(deadline, async {
        tokio::try_join!(child.wait(), read_stream(stdout), read_stream(stderr))
    })
    .await;

    match collected {
        Ok(Ok((status, stdout, stderr))) => {
            group.disarm();
            debug!(
                code = ?status.code(),
                stdout_len = stdout.len(),
                stderr_len = stderr.len(),
                "program exited"
            );
            Ok(ProcessOutcome::Exited {
                status,
                stdout,
                stderr,
            })
        }
        Ok(Err(e)) => {
            group.terminate();
            Err(SandboxError::Wait(e))
        }
        Err(_) => {
            warn!(?deadline, "program exceeded its deadline");
            group.terminate();
            // The direct child gets SIGKILL as well in case it ignores SIGTERM
            let _ = child.start_kill();
            Ok(ProcessOutcome::TimedOut)
        }
    }
}
