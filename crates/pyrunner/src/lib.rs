//! A library for running untrusted Python snippets.
//!
//! pyrunner executes a snippet once per input value in a separate interpreter
//! process, enforces a wall-clock deadline on each run, captures what the
//! snippet prints, and reports coarse diagnostics about it.
//!
//! # Features
//!
//! - **Process isolation**: Each run is a child process in its own process group, terminated as a unit on timeout.
//! - **Simulated input**: One input value per run, fed to the snippet's `input()` calls.
//! - **Output framing**: Captured stdout is delimited by sentinel lines and extracted after the run.
//! - **Complexity heuristic**: Loop-nesting classification of the snippet's syntax tree.
//! - **Accounting**: Wall-clock time and engine memory delta per request.
//! - **TOML configuration**: Interpreter command, deadline, environment and denylist.
//!
//! The denylist is a lexical filter only. It is not a security boundary.

pub use accounting::{Measurement, TrackingAllocator, measure};
pub use analyzer::classify;
pub use config::{Config, ConfigError, EXAMPLE_CONFIG};
pub use policy::{Denylist, PolicyError};
pub use runner::{ExecutionRequest, Runner, ValidationError};
pub use sandbox::SandboxError;
pub use types::{
    ComplexityVerdict, ExecutionReport, Inputs, RunResult, RunStatus, SpaceBucket,
};

pub mod accounting;
pub mod analyzer;
pub mod config;
pub mod policy;
pub mod runner;
pub mod sandbox;
pub mod types;
