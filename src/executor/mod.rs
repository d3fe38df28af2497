//! Notebook execution engine
//!
//! The `Executor` trait runs one exported script in isolation; the
//! `NotebookRunner` drives discovery, conversion and execution for a directory.

mod interpreter;
mod runner;

use std::io;
use std::path::Path;
use thiserror::Error;

pub use interpreter::InterpreterExecutor;
pub use runner::NotebookRunner;

/// Errors raised while running an exported script
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Failed to start interpreter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Interpreter I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Script exited with {}", exit_description(.code))]
    Failed { code: Option<i32>, trace: String },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Runs a block of source text as a fresh top-level program.
///
/// Implementations must not let one script affect the state seen by the
/// next, and must report every failure through the returned error instead
/// of panicking. On success they return whatever the script wrote to its
/// error stream (warnings, deprecation notices), possibly empty.
pub trait Executor {
    async fn execute(&self, source: &str, working_dir: &Path) -> Result<String, ExecutionError>;
}
