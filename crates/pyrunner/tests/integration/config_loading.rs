use pyrunner::{Config, ConfigError};

use super::FIXTURES_PATH;

#[test]
fn test_load_valid_config() {
    let path = format!("{FIXTURES_PATH}/configs/valid_full.toml");
    let config = Config::from_file(&path).expect("Failed to load config");

    assert_eq!(config.time_limit, 5.0);
    assert_eq!(config.run_command, vec!["python3", "-I", "{source}"]);
    assert_eq!(config.max_parallel_runs, 2);
    assert!(config.forbidden_patterns.contains(&"import socket".to_owned()));
}

#[test]
fn test_load_minimal_config() {
    let path = format!("{FIXTURES_PATH}/configs/valid_minimal.toml");
    let config = Config::from_file(&path).expect("Failed to load config");

    assert_eq!(config.time_limit, 2.0);
    assert_eq!(config.run_command, vec!["python3", "{source}"]);
    assert_eq!(config.forbidden_patterns.len(), 6);
}

#[test]
fn test_load_invalid_placeholder() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_no_placeholder.toml");
    let result = Config::from_file(&path);

    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_load_invalid_time_limit() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_time_limit.toml");
    let result = Config::from_file(&path);

    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_load_missing_file() {
    let path = format!("{FIXTURES_PATH}/configs/does_not_exist.toml");
    let result = Config::from_file(&path);

    assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
}
