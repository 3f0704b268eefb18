//! Integration tests for pyrunner
//!
//! These tests require a `python3` interpreter on `PATH`.
//! Run with: cargo test -p pyrunner --features integration-tests

#![cfg(feature = "integration-tests")]

use std::fs;
use std::path::Path;

use pyrunner::{Config, ExecutionReport, ExecutionRequest, Inputs, Runner};

mod cleanup;
mod config_loading;
mod execution;

const FIXTURES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// Helper to get fixture file content
pub(crate) fn fixture_source(name: &str) -> String {
    let path = format!("{FIXTURES_PATH}/sources/{name}");
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {path}: {e}"))
}

/// Config whose program files land in `dir`
pub(crate) fn test_config(dir: &Path) -> Config {
    Config::default().with_temp_dir(dir)
}

/// Execute `code` with `inputs` and return the report
pub(crate) async fn run(config: Config, code: &str, inputs: Inputs) -> ExecutionReport {
    let request =
        ExecutionRequest::new(Some(code.to_owned()), inputs).expect("request should be valid");
    Runner::new(config).execute(&request).await
}

/// Count the entries left in `dir`
pub(crate) fn leftover_files(dir: &Path) -> usize {
    fs::read_dir(dir).expect("Failed to read temp dir").count()
}
