//! Configuration module
//!
//! Settings are layered: built-in defaults, then a config file, then
//! `NB_RUNNER_*` environment variables, then command-line flags.

mod env;
mod file;

pub use env::EnvConfig;
pub use file::ConfigFile;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::discovery::{Discovery, DEFAULT_SKIP_MARKER, NOTEBOOK_EXTENSION};
use crate::utils::logger::LogLevel;

/// Runner configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory to scan; the current directory when unset
    pub directory: Option<PathBuf>,

    /// Notebooks whose file name contains this are skipped (empty disables)
    pub skip_marker: String,

    /// Notebook file extension, without the dot
    pub extension: String,

    /// Interpreter used to run exported scripts
    pub interpreter: InterpreterConfig,

    /// Default log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            directory: None,
            skip_marker: DEFAULT_SKIP_MARKER.to_string(),
            extension: NOTEBOOK_EXTENSION.to_string(),
            interpreter: InterpreterConfig::default(),
            log_level: "warn".to_string(),
        }
    }
}

/// External interpreter command
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["-".to_string()],
        }
    }
}

impl AppConfig {
    /// Apply environment overrides on top of this config
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(dir) = &env.directory {
            self.directory = Some(PathBuf::from(dir));
        }
        if let Some(marker) = &env.skip_marker {
            self.skip_marker = marker.clone();
        }
        if let Some(extension) = &env.extension {
            self.extension = extension.clone();
        }
        if let Some(program) = &env.interpreter {
            self.interpreter.program = program.clone();
        }
        if let Some(level) = &env.log_level {
            self.log_level = level.clone();
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.extension.is_empty() {
            anyhow::bail!("Notebook extension must not be empty");
        }
        if self.extension.starts_with('.') {
            anyhow::bail!(
                "Notebook extension '{}' must be given without the leading dot",
                self.extension
            );
        }
        if self.interpreter.program.trim().is_empty() {
            anyhow::bail!("Interpreter program must not be empty");
        }
        if LogLevel::from_str(&self.log_level).is_none() {
            anyhow::bail!("Unknown log level: {}", self.log_level);
        }
        Ok(())
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_str(&self.log_level).unwrap_or(LogLevel::Warn)
    }

    /// Discovery rules described by this config
    pub fn discovery(&self) -> Discovery {
        Discovery::new()
            .with_extension(&self.extension)
            .with_skip_marker(Some(self.skip_marker.clone()))
    }

    /// Directory to scan, falling back to the current directory
    pub fn directory(&self) -> Result<PathBuf> {
        match &self.directory {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to determine current directory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.skip_marker, "skiptest");
        assert_eq!(config.extension, "ipynb");
        assert_eq!(config.interpreter.program, "python3");
        assert_eq!(config.interpreter.args, vec!["-"]);
        assert_eq!(config.log_level(), LogLevel::Warn);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_env() {
        let mut config = AppConfig::default();
        let env = EnvConfig {
            directory: Some("/notebooks".to_string()),
            skip_marker: Some("_slow".to_string()),
            interpreter: Some("python3.11".to_string()),
            ..Default::default()
        };
        config.apply_env(&env);

        assert_eq!(config.directory, Some(PathBuf::from("/notebooks")));
        assert_eq!(config.skip_marker, "_slow");
        assert_eq!(config.interpreter.program, "python3.11");
        assert_eq!(config.extension, "ipynb");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.extension = ".ipynb".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.interpreter.program = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_discovery_from_config() {
        let mut config = AppConfig::default();
        config.skip_marker = String::new();
        assert_eq!(config.discovery().skip_marker(), None);
        assert!(config.discovery().matches("slow_skiptest.ipynb"));
    }

    #[test]
    fn test_explicit_directory() {
        let mut config = AppConfig::default();
        config.directory = Some(PathBuf::from("/data/notebooks"));
        assert_eq!(config.directory().unwrap(), PathBuf::from("/data/notebooks"));
    }
}
