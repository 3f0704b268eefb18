//! Temporary program files
//!
//! Each run writes its framed program to a fresh file that only that run
//! uses. The file is removed on every exit path: explicitly through
//! [`ProgramFile::close`], which reports removal failures, or by `Drop` when
//! the run is abandoned early.

use std::path::Path;

use tempfile::{Builder, NamedTempFile};
use tracing::{debug, instrument};

use crate::sandbox::SandboxError;

/// A transient program artifact owned by exactly one run
#[derive(Debug)]
pub struct ProgramFile {
    file: NamedTempFile,
}

impl ProgramFile {
    /// Create the file in `dir` (or the system temp dir) and write `contents`
    #[instrument(skip(contents), fields(len = contents.len()))]
    pub async fn create(dir: Option<&Path>, contents: &str) -> Result<Self, SandboxError> {
        let mut builder = Builder::new();
        builder.prefix("pyrunner-").suffix(".py");
        let file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(SandboxError::ProgramFile)?;

        tokio::fs::write(file.path(), contents)
            .await
            .map_err(SandboxError::ProgramFile)?;

        debug!(path = %file.path().display(), "wrote program file");
        Ok(Self { file })
    }

    /// Get the path of the program file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Remove the file, reporting any failure
    pub fn close(self) -> std::io::Result<()> {
        self.file.close()
    }
}
