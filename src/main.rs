//! nb-runner - Jupyter notebook smoke-test runner
//!
//! Discovers the notebooks in a directory, exports each one's code cells as a
//! script, runs it in a fresh interpreter and reports the outcome. The process
//! exits with status 1 if any notebook failed.
//!
//! ## Usage
//!
//! ```bash
//! # Run every notebook in the current directory
//! nb-runner run
//!
//! # Run a docs directory with a specific interpreter
//! nb-runner run docs/notebooks --interpreter python3.12
//!
//! # Show which notebooks would run
//! nb-runner list docs/notebooks
//!
//! # Export a notebook as a script
//! nb-runner convert docs/notebooks/intro.ipynb -o intro.py
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

mod cli;
mod config;
mod discovery;
mod executor;
mod models;
mod notebook;
mod output;
mod utils;

use cli::Args;
use config::{AppConfig, ConfigFile, EnvConfig};
use executor::{InterpreterExecutor, NotebookRunner};
use models::{FailureKind, Outcome};
use notebook::{Notebook, ScriptExporter};
use output::ConsoleReporter;
use utils::logger::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let env = EnvConfig::load();
    let config_path = args
        .config
        .clone()
        .or_else(|| env.config_file.as_ref().map(PathBuf::from));

    let mut config = ConfigFile::resolve(config_path.as_deref())?.runner;
    config.apply_env(&env);
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    config.validate()?;

    init_logger(LogLevel::from_verbosity(args.verbose, config.log_level()));

    match args.command {
        cli::Command::Run(run_args) => run_notebooks(config, run_args).await,
        cli::Command::List(list_args) => {
            list_notebooks(config, list_args)?;
            Ok(ExitCode::SUCCESS)
        }
        cli::Command::Convert(convert_args) => {
            convert_notebook(convert_args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_notebooks(mut config: AppConfig, args: cli::RunArgs) -> Result<ExitCode> {
    if let Some(dir) = args.dir {
        config.directory = Some(dir);
    }
    if let Some(marker) = args.skip_marker {
        config.skip_marker = marker;
    }
    if let Some(program) = args.interpreter {
        config.interpreter.program = program;
    }
    if !args.interpreter_args.is_empty() {
        config.interpreter.args = args.interpreter_args;
    }
    config.validate()?;

    let dir = config.directory()?;
    let executor = InterpreterExecutor::from_config(&config.interpreter);
    let runner = NotebookRunner::new(executor).with_discovery(config.discovery());
    info!(
        "Running notebooks in {} with {} (skip marker: {:?})",
        dir.display(),
        runner.executor().program(),
        runner.discovery().skip_marker()
    );

    let mut reporter = ConsoleReporter::stdio();
    let summary = runner.run(&dir, &mut reporter).await?;

    for failure in summary.failures() {
        if let Outcome::Failure { kind, .. } = &failure.outcome {
            info!("Failed ({} error): {}", kind, failure.path.display());
        }
    }
    if !summary.is_all_passed() {
        info!(
            "{} conversion and {} execution failures",
            summary.failed_with(FailureKind::Conversion),
            summary.failed_with(FailureKind::Execution)
        );
    }

    Ok(ExitCode::from(summary.exit_status()))
}

fn list_notebooks(mut config: AppConfig, args: cli::ListArgs) -> Result<()> {
    if let Some(dir) = args.dir {
        config.directory = Some(dir);
    }
    if let Some(marker) = args.skip_marker {
        config.skip_marker = marker;
    }

    let dir = config.directory()?;
    for path in config.discovery().discover(&dir)? {
        println!("{}", path.display());
    }

    Ok(())
}

fn convert_notebook(args: cli::ConvertArgs) -> Result<()> {
    let notebook = Notebook::read(&args.notebook)
        .with_context(|| format!("Failed to convert {}", args.notebook.display()))?;

    let exporter = if args.no_header {
        ScriptExporter::new().without_header()
    } else {
        ScriptExporter::new()
    };
    let script = exporter.export(&notebook);

    match args.output {
        Some(path) => {
            std::fs::write(&path, &script.source)
                .with_context(|| format!("Failed to write script: {}", path.display()))?;
            info!(
                "Wrote {} code cells to {}",
                script.metadata.code_cells,
                path.display()
            );
        }
        None => print!("{}", script.source),
    }

    Ok(())
}
