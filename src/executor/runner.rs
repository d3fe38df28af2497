//! Notebook test runner
//!
//! Runs every discovered notebook in order and collects one result per file.
//! Per-notebook errors become failed results; only discovery errors abort.

use std::path::Path;
use tracing::{debug, info};

use super::Executor;
use crate::discovery::{Discovery, DiscoveryError};
use crate::models::{display_name, NotebookError, NotebookResult, RunSummary};
use crate::notebook::{Notebook, ScriptExporter};
use crate::output::Reporter;
use crate::utils::timer::Timer;

/// Runner for a directory of notebooks
pub struct NotebookRunner<E> {
    executor: E,
    discovery: Discovery,
    exporter: ScriptExporter,
}

impl<E: Executor> NotebookRunner<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            discovery: Discovery::new(),
            exporter: ScriptExporter::new(),
        }
    }

    pub fn with_discovery(mut self, discovery: Discovery) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Convert and execute one notebook, returning the interpreter's stderr
    pub async fn run_notebook(&self, path: &Path) -> Result<String, NotebookError> {
        let notebook = Notebook::read(path)?;
        let script = self.exporter.export(&notebook);
        debug!(
            "{}: {} {} code cells ({} skipped) as {} script",
            path.display(),
            script.metadata.code_cells,
            script.metadata.language,
            script.metadata.skipped_cells,
            script.metadata.file_extension
        );

        let working_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let stderr = self.executor.execute(&script.source, working_dir).await?;
        Ok(stderr)
    }

    /// Run one notebook, reporting its start and result
    pub async fn run_test<R: Reporter>(&self, path: &Path, reporter: &mut R) -> NotebookResult {
        let name = display_name(path);
        reporter.started(&name);

        let timer = Timer::start(&name);
        let result = match self.run_notebook(path).await {
            Ok(stderr) => {
                if !stderr.trim().is_empty() {
                    reporter.stderr(&name, &stderr);
                }
                NotebookResult::success(path, timer.elapsed_ms())
            }
            Err(e) => {
                info!("{} failed ({} error): {}", name, e.kind(), e);
                NotebookResult::failure(path, timer.elapsed_ms(), &e)
            }
        };
        timer.stop();

        reporter.finished(&result);
        result
    }

    /// Run every notebook in `dir`
    pub async fn run<R: Reporter>(
        &self,
        dir: &Path,
        reporter: &mut R,
    ) -> Result<RunSummary, DiscoveryError> {
        let paths = self.discovery.discover(dir)?;
        info!("Found {} notebooks in {}", paths.len(), dir.display());

        let mut results = Vec::with_capacity(paths.len());
        for path in &paths {
            let result = self.run_test(path, reporter).await;
            results.push(result);
        }

        let summary = RunSummary::new(dir, results);
        info!("{}", summary);

        Ok(summary)
    }
}
