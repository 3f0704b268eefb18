//! Configuration file loading for pyrunner
//!
//! Handles loading and parsing configuration files using the config crate.

use std::path::Path;
use std::time::Duration;

use config::{Config as ConfigBuilder, File, FileFormat};

use crate::config::{Config, ConfigError, SOURCE_PLACEHOLDER};

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config = ConfigBuilder::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_limit <= 0.0 || Duration::try_from_secs_f64(self.time_limit).is_err() {
            return Err(ConfigError::Invalid(format!(
                "time_limit must be a positive number of seconds, got {}",
                self.time_limit
            )));
        }
        if self.run_command.is_empty() || self.run_command[0].is_empty() {
            return Err(ConfigError::Invalid("run_command is empty".to_owned()));
        }
        if !self
            .run_command
            .iter()
            .any(|arg| arg.contains(SOURCE_PLACEHOLDER))
        {
            return Err(ConfigError::Invalid(format!(
                "run_command must reference {SOURCE_PLACEHOLDER}"
            )));
        }
        if self.max_parallel_runs == 0 {
            return Err(ConfigError::Invalid(
                "max_parallel_runs must be at least 1".to_owned(),
            ));
        }
        if self.forbidden_patterns.iter().any(String::is_empty) {
            return Err(ConfigError::Invalid(
                "forbidden_patterns contains an empty pattern".to_owned(),
            ));
        }

        Ok(())
    }
}
