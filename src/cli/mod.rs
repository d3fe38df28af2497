//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Run every notebook in a directory as a smoke test
#[derive(Parser, Debug)]
#[command(name = "nb-runner")]
#[command(version)]
#[command(about = "Execute every Jupyter notebook in a directory and report failures")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run all notebooks in a directory
    Run(RunArgs),

    /// List the notebooks a run would execute
    List(ListArgs),

    /// Export a notebook's code cells as a script
    Convert(ConvertArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Notebook directory (defaults to the current directory)
    pub dir: Option<PathBuf>,

    /// Skip notebooks whose file name contains this (empty disables skipping)
    #[arg(long)]
    pub skip_marker: Option<String>,

    /// Interpreter program
    #[arg(long)]
    pub interpreter: Option<String>,

    /// Interpreter argument (repeatable, replaces the default `-`)
    #[arg(long = "interpreter-arg", allow_hyphen_values = true)]
    pub interpreter_args: Vec<String>,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Notebook directory (defaults to the current directory)
    pub dir: Option<PathBuf>,

    /// Skip notebooks whose file name contains this (empty disables skipping)
    #[arg(long)]
    pub skip_marker: Option<String>,
}

/// Arguments for convert command
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Notebook to convert
    pub notebook: PathBuf,

    /// Write the script here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Leave out the interpreter/coding header
    #[arg(long)]
    pub no_header: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args_parsing() {
        let args = Args::parse_from([
            "nb-runner",
            "run",
            "docs/notebooks",
            "--skip-marker",
            "_slow",
            "--interpreter",
            "python3.12",
            "--interpreter-arg",
            "-u",
            "--interpreter-arg",
            "-",
        ]);
        match args.command {
            Command::Run(run_args) => {
                assert_eq!(run_args.dir, Some(PathBuf::from("docs/notebooks")));
                assert_eq!(run_args.skip_marker.as_deref(), Some("_slow"));
                assert_eq!(run_args.interpreter.as_deref(), Some("python3.12"));
                assert_eq!(run_args.interpreter_args, vec!["-u", "-"]);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_defaults() {
        let args = Args::parse_from(["nb-runner", "run"]);
        assert_eq!(args.verbose, 0);
        match args.command {
            Command::Run(run_args) => {
                assert_eq!(run_args.dir, None);
                assert!(run_args.interpreter_args.is_empty());
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = Args::parse_from(["nb-runner", "list", "-vv", "--config", "ci.yaml"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.config, Some(PathBuf::from("ci.yaml")));
        assert!(matches!(args.command, Command::List(_)));
    }

    #[test]
    fn test_convert_args() {
        let args = Args::parse_from(["nb-runner", "convert", "demo.ipynb", "-o", "demo.py"]);
        match args.command {
            Command::Convert(convert_args) => {
                assert_eq!(convert_args.notebook, PathBuf::from("demo.ipynb"));
                assert_eq!(convert_args.output, Some(PathBuf::from("demo.py")));
                assert!(!convert_args.no_header);
            }
            _ => panic!("Expected Convert command"),
        }
    }
}
