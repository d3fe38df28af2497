//! Console reporter
//!
//! Prints `-- <name>` when a notebook starts and `-- <name> OK` or
//! `-- <name> ***Failed` when it finishes. Failure traces and whatever a
//! passing notebook wrote to stderr go to the error stream.

use std::io::{self, Stderr, Stdout, Write};
use tracing::warn;

use crate::models::{NotebookResult, Outcome};

/// Receives progress events from the runner
pub trait Reporter {
    fn started(&mut self, name: &str);
    /// Interpreter stderr from a notebook that did not fail
    fn stderr(&mut self, name: &str, text: &str);
    fn finished(&mut self, result: &NotebookResult);
}

/// Reporter writing the line protocol to a pair of streams
pub struct ConsoleReporter<O, E> {
    out: O,
    err: E,
}

impl ConsoleReporter<Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> ConsoleReporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{line}")?;
        // The interpreter shares our stdout, keep the ordering intact
        self.out.flush()
    }

    fn write_diagnostic(&mut self, diagnostic: &str) -> io::Result<()> {
        self.err.write_all(diagnostic.as_bytes())?;
        if !diagnostic.ends_with('\n') {
            self.err.write_all(b"\n")?;
        }
        self.err.flush()
    }
}

impl<O: Write, E: Write> Reporter for ConsoleReporter<O, E> {
    fn started(&mut self, name: &str) {
        if let Err(e) = self.write_line(&format!("-- {name}")) {
            warn!("Failed to write to console: {}", e);
        }
    }

    fn stderr(&mut self, _name: &str, text: &str) {
        if let Err(e) = self.write_diagnostic(text) {
            warn!("Failed to write to console: {}", e);
        }
    }

    fn finished(&mut self, result: &NotebookResult) {
        if let Err(e) = self.write_line(&result.to_string()) {
            warn!("Failed to write to console: {}", e);
        }

        if let Outcome::Failure { diagnostic, .. } = &result.outcome {
            if let Err(e) = self.write_diagnostic(diagnostic) {
                warn!("Failed to write to console: {}", e);
            }
        }
    }
}
