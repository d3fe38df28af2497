//! Console output
//!
//! Reports notebook progress and results as they happen.

mod console;

pub use console::{ConsoleReporter, Reporter};
