//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "NB_RUNNER";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// Notebook directory from NB_RUNNER_DIR
    pub directory: Option<String>,
    /// Skip marker from NB_RUNNER_SKIP_MARKER
    pub skip_marker: Option<String>,
    /// Notebook extension from NB_RUNNER_EXTENSION
    pub extension: Option<String>,
    /// Interpreter program from NB_RUNNER_INTERPRETER
    pub interpreter: Option<String>,
    /// Log level from NB_RUNNER_LOG
    pub log_level: Option<String>,
    /// Config file from NB_RUNNER_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}"));

        Self {
            directory: get("DIR"),
            skip_marker: get("SKIP_MARKER"),
            extension: get("EXTENSION"),
            interpreter: get("INTERPRETER"),
            log_level: get("LOG"),
            config_file: get("CONFIG"),
        }
    }
}
