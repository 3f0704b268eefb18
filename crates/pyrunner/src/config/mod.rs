use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::{DEFAULT_FORBIDDEN_PATTERNS, Denylist};

mod loader;

/// Example configuration embedded at compile time.
///
/// Library users can access this to generate a starter config file.
pub const EXAMPLE_CONFIG: &str = include_str!("../../pyrunner.example.toml");

/// Placeholder in `run_command` replaced by the temporary program path
pub const SOURCE_PLACEHOLDER: &str = "{source}";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Config for pyrunner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Wall-clock deadline for a single run, in seconds
    #[serde(default = "default_time_limit")]
    pub time_limit: f64,

    /// Interpreter command and arguments; `{source}` is the program path
    #[serde(default = "default_run_command")]
    pub run_command: Vec<String>,

    /// Extra environment variables for the interpreter
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Directory for temporary program files (system temp dir if unset)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,

    /// Maximum number of runs of one request executing at the same time
    #[serde(default = "default_max_parallel_runs")]
    pub max_parallel_runs: usize,

    /// Case-insensitive substrings that reject a snippet before it runs
    #[serde(default = "default_forbidden_patterns")]
    pub forbidden_patterns: Vec<String>,
}

impl Config {
    /// Create a new config from the embedded example
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config with built-in defaults and no extra environment
    pub fn minimal() -> Self {
        Self {
            time_limit: default_time_limit(),
            run_command: default_run_command(),
            env: HashMap::new(),
            temp_dir: None,
            max_parallel_runs: default_max_parallel_runs(),
            forbidden_patterns: default_forbidden_patterns(),
        }
    }

    /// Set the per-run deadline in seconds
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = seconds;
        self
    }

    /// Set the directory for temporary program files
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Set how many runs of one request may execute concurrently
    pub fn with_max_parallel_runs(mut self, runs: usize) -> Self {
        self.max_parallel_runs = runs;
        self
    }

    /// Set the interpreter command
    pub fn with_run_command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_command = command.into_iter().map(Into::into).collect();
        self
    }

    /// Per-run deadline as a duration
    ///
    /// Saturates at [`Duration::MAX`] for limits that `validate` would reject.
    pub fn deadline(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_limit).unwrap_or(Duration::MAX)
    }

    /// Build the denylist from the configured patterns
    pub fn denylist(&self) -> Denylist {
        Denylist::new(self.forbidden_patterns.iter().cloned())
    }

    /// Expand the `{source}` placeholder in the run command
    pub fn expand_command(&self, source: &Path) -> Vec<String> {
        let source = source.to_string_lossy();
        self.run_command
            .iter()
            .map(|arg| arg.replace(SOURCE_PLACEHOLDER, &source))
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_toml(EXAMPLE_CONFIG).expect("embedded default config should be valid")
    }
}

fn default_time_limit() -> f64 {
    10.0
}

fn default_run_command() -> Vec<String> {
    vec!["python3".to_owned(), SOURCE_PLACEHOLDER.to_owned()]
}

fn default_max_parallel_runs() -> usize {
    1
}

fn default_forbidden_patterns() -> Vec<String> {
    DEFAULT_FORBIDDEN_PATTERNS
        .iter()
        .map(|p| (*p).to_owned())
        .collect()
}
