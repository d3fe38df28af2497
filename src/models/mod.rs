//! Data models for notebook runs
//!
//! Outcomes, per-notebook results and run summaries.

mod run_result;

pub use run_result::{display_name, FailureKind, NotebookError, NotebookResult, Outcome, RunSummary};
