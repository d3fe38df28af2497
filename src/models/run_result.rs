//! Run result models
//!
//! Per-notebook outcomes and the summary of a whole run.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::executor::ExecutionError;
use crate::notebook::ConversionError;

/// Why a notebook failed
#[derive(Error, Debug)]
pub enum NotebookError {
    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Execution failed: {0}")]
    Execution(#[from] ExecutionError),
}

impl NotebookError {
    pub fn kind(&self) -> FailureKind {
        match self {
            NotebookError::Conversion(_) => FailureKind::Conversion,
            NotebookError::Execution(_) => FailureKind::Execution,
        }
    }

    /// Text shown to the user for this failure: the interpreter's trace when
    /// there is one, the error message otherwise
    pub fn diagnostic(&self) -> String {
        if let NotebookError::Execution(ExecutionError::Failed { trace, .. }) = self {
            if !trace.trim().is_empty() {
                return trace.clone();
            }
        }
        self.to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Conversion,
    Execution,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Conversion => write!(f, "conversion"),
            FailureKind::Execution => write!(f, "execution"),
        }
    }
}

/// Verdict for one notebook
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure {
        kind: FailureKind,
        diagnostic: String,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Console marker printed after the notebook name
    pub fn marker(&self) -> &'static str {
        match self {
            Outcome::Success => "OK",
            Outcome::Failure { .. } => "***Failed",
        }
    }
}

/// Result of running a single notebook
#[derive(Clone, Debug)]
pub struct NotebookResult {
    pub name: String,
    pub path: PathBuf,
    pub outcome: Outcome,
    pub duration_ms: u64,
}

impl NotebookResult {
    pub fn success(path: impl Into<PathBuf>, duration_ms: u64) -> Self {
        let path = path.into();
        Self {
            name: display_name(&path),
            path,
            outcome: Outcome::Success,
            duration_ms,
        }
    }

    pub fn failure(path: impl Into<PathBuf>, duration_ms: u64, error: &NotebookError) -> Self {
        let path = path.into();
        Self {
            name: display_name(&path),
            path,
            outcome: Outcome::Failure {
                kind: error.kind(),
                diagnostic: error.diagnostic(),
            },
            duration_ms,
        }
    }
}

impl fmt::Display for NotebookResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-- {} {}", self.name, self.outcome.marker())
    }
}

/// Base name shown on the console
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Summary of one run over a directory
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub directory: PathBuf,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub total_duration_ms: u64,
    pub results: Vec<NotebookResult>,
}

impl RunSummary {
    pub fn new(directory: impl Into<PathBuf>, results: Vec<NotebookResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.outcome.is_success()).count();
        let total_duration_ms = results.iter().map(|r| r.duration_ms).sum();

        Self {
            directory: directory.into(),
            total,
            passed,
            failed: total - passed,
            total_duration_ms,
            results,
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Process exit status: 1 when any notebook failed
    pub fn exit_status(&self) -> u8 {
        if self.is_all_passed() {
            0
        } else {
            1
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &NotebookResult> {
        self.results.iter().filter(|r| !r.outcome.is_success())
    }

    /// Number of notebooks that failed at the given stage
    pub fn failed_with(&self, kind: FailureKind) -> usize {
        self.failures()
            .filter(|r| matches!(&r.outcome, Outcome::Failure { kind: k, .. } if *k == kind))
            .count()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} notebooks, {} passed, {} failed in {}ms",
            self.directory.display(),
            self.total,
            self.passed,
            self.failed,
            self.total_duration_ms
        )
    }
}
