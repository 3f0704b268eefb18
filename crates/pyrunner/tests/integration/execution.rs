use std::time::Instant;

use pyrunner::{ComplexityVerdict, Inputs};

use super::{fixture_source, run, test_config};

#[tokio::test]
async fn test_hello() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(test_config(dir.path()), "print('hi')", Inputs::from("")).await;

    assert_eq!(report.output, "hi");
    assert_eq!(report.error, "");
    assert!(report.inputs_used.is_empty());
    assert_eq!(report.time_complexity, ComplexityVerdict::Constant);
    assert!(report.space_complexity.starts_with("O(1) - Constant space"));
}

#[tokio::test]
async fn test_inputs_run_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(
        test_config(dir.path()),
        "x = input(); print(x)",
        Inputs::from("a\nb\nc"),
    )
    .await;

    assert_eq!(report.output, "a\nb\nc");
    assert_eq!(report.inputs_used, vec!["a", "b", "c"]);
    assert_eq!(report.error, "");
}

#[tokio::test]
async fn test_parallel_runs_keep_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path()).with_max_parallel_runs(4);
    let inputs: Vec<String> = (0..8).map(|i| i.to_string()).collect();

    let report = run(
        config,
        "import time\nn = int(input())\ntime.sleep((8 - n) * 0.05)\nprint(n * n)",
        Inputs::from(inputs),
    )
    .await;

    assert_eq!(report.output, "0\n1\n4\n9\n16\n25\n36\n49");
    assert_eq!(report.inputs_used.len(), 8);
}

#[tokio::test]
async fn test_second_input_call_gets_empty_string() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(
        test_config(dir.path()),
        "a = input()\nb = input()\nprint(repr(a), repr(b))",
        Inputs::from("first"),
    )
    .await;

    assert_eq!(report.output, "'first' ''");
}

#[tokio::test]
async fn test_input_without_values_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(
        test_config(dir.path()),
        "print(repr(input('prompt> ')))",
        Inputs::none(),
    )
    .await;

    assert_eq!(report.output, "''");
}

#[tokio::test]
async fn test_list_inputs_used_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(
        test_config(dir.path()),
        "print('[' + input() + ']')",
        Inputs::from(vec!["  padded  ".to_owned(), "quote ' and \" \\".to_owned()]),
    )
    .await;

    assert_eq!(report.output, "[  padded  ]\n[quote ' and \" \\]");
}

#[tokio::test]
async fn test_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path()).with_time_limit(1.0);
    let start = Instant::now();

    let report = run(config, "while True: pass", Inputs::none()).await;

    assert_eq!(report.output, "");
    assert!(report.error.contains("Code execution timed out (1 second limit)"));
    assert!(report.execution_time_seconds >= 1.0);
    assert_eq!(report.time_complexity, ComplexityVerdict::Linear);
    assert!(start.elapsed().as_secs() < 10);
}

#[tokio::test]
async fn test_timeout_does_not_stop_later_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path()).with_time_limit(1.0);

    let report = run(
        config,
        &fixture_source("slow_on_zero.py"),
        Inputs::from("0\n3"),
    )
    .await;

    assert_eq!(report.output, "\n9");
    assert!(report.error.contains("timed out"));
    assert_eq!(report.inputs_used, vec!["0", "3"]);
}

#[tokio::test]
async fn test_exception_reports_stderr_and_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(
        test_config(dir.path()),
        "print('before')\nraise ValueError('boom')",
        Inputs::none(),
    )
    .await;

    assert_eq!(report.output, "before");
    assert!(report.error.contains("ValueError: boom"));
}

#[tokio::test]
async fn test_sys_exit_still_frames_output() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(
        test_config(dir.path()),
        "import sys\nprint('done')\nsys.exit(3)",
        Inputs::none(),
    )
    .await;

    assert_eq!(report.output, "done");
}

#[tokio::test]
async fn test_syntax_error_is_unknown_and_reported() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(test_config(dir.path()), "print('unclosed'", Inputs::none()).await;

    assert_eq!(report.time_complexity, ComplexityVerdict::Unknown);
    assert_eq!(report.output, "");
    assert!(report.error.contains("SyntaxError"));
}

#[tokio::test]
async fn test_nested_loops_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(
        test_config(dir.path()),
        &fixture_source("matrix.py"),
        Inputs::from("3"),
    )
    .await;

    assert_eq!(report.time_complexity, ComplexityVerdict::Quadratic);
    assert_eq!(report.output, "0 0 0\n0 1 2\n0 2 4");
}

#[tokio::test]
async fn test_forbidden_pattern_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(
        test_config(dir.path()),
        "import subprocess\nsubprocess.run(['ls'])",
        Inputs::none(),
    )
    .await;

    assert_eq!(
        report.error,
        "Error: Forbidden code pattern detected: subprocess"
    );
    assert_eq!(report.space_complexity, "N/A");
}

#[tokio::test]
async fn test_idempotence() {
    let dir = tempfile::tempdir().unwrap();
    let code = fixture_source("sum_input.py");

    let first = run(test_config(dir.path()), &code, Inputs::from("4\n10")).await;
    let second = run(test_config(dir.path()), &code, Inputs::from("4\n10")).await;

    assert_eq!(first.output, "10\n55");
    assert_eq!(first.output, second.output);
    assert_eq!(first.time_complexity, second.time_complexity);
    assert_eq!(first.error, second.error);
}
