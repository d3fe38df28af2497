//! Notebook documents
//!
//! Reading `.ipynb` files and exporting their code cells as a script.

mod document;
mod exporter;

pub use document::{ConversionError, Notebook};
pub use exporter::ScriptExporter;
