//! Notebook document model
//!
//! Reads nbformat 1 to 4 JSON documents into a single v4-shaped model.
//! Older documents are upgraded on read, so the exporter only ever sees v4.

use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Major schema version the model is shaped after
pub const CURRENT_NBFORMAT: u32 = 4;

/// Newest v4 minor version the reader is known to handle
pub const CURRENT_NBFORMAT_MINOR: u32 = 5;

/// Errors raised while turning a file into a notebook document
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to read notebook {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Notebook is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("Notebook has no nbformat version field")]
    MissingVersion,

    #[error("Unsupported nbformat version {0} (expected 1 to 4)")]
    UnsupportedVersion(u64),

    #[error("Notebook does not match the nbformat {version} schema: {source}")]
    Schema {
        version: u32,
        #[source]
        source: serde_json::Error,
    },
}

/// Cell text stored either as one string or as a list of lines
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MultilineString {
    Text(String),
    Lines(Vec<String>),
}

impl MultilineString {
    /// Join the stored fragments verbatim (list entries keep their own newlines)
    pub fn joined(&self) -> String {
        match self {
            MultilineString::Text(text) => text.clone(),
            MultilineString::Lines(lines) => lines.concat(),
        }
    }
}

impl Default for MultilineString {
    fn default() -> Self {
        MultilineString::Text(String::new())
    }
}

/// A parsed notebook in the v4 shape
#[derive(Clone, Debug, Deserialize)]
pub struct Notebook {
    pub nbformat: u32,

    #[serde(default)]
    pub nbformat_minor: u32,

    #[serde(default)]
    pub metadata: NotebookMetadata,

    #[serde(default)]
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NotebookMetadata {
    #[serde(default)]
    pub kernelspec: Option<KernelSpec>,

    #[serde(default)]
    pub language_info: Option<LanguageInfo>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct KernelSpec {
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LanguageInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub file_extension: Option<String>,
}

/// One notebook cell; only code cells keep their content
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Code(CodeCell),
    Markdown,
    Raw,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CodeCell {
    pub source: MultilineString,

    #[serde(default)]
    pub execution_count: Option<u32>,
}

impl Notebook {
    /// Read and parse a notebook file
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConversionError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConversionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse notebook JSON, upgrading v1 to v3 documents to the v4 model
    pub fn parse(text: &str) -> Result<Self, ConversionError> {
        let value: Value = serde_json::from_str(text).map_err(ConversionError::Json)?;

        let version = value
            .get("nbformat")
            .and_then(Value::as_u64)
            .ok_or(ConversionError::MissingVersion)?;

        match version {
            4 => {
                let notebook: Notebook = serde_json::from_value(value)
                    .map_err(|source| ConversionError::Schema { version: 4, source })?;
                if notebook.nbformat_minor > CURRENT_NBFORMAT_MINOR {
                    warn!(
                        "Notebook minor version 4.{} is newer than 4.{}; reading it anyway",
                        notebook.nbformat_minor, CURRENT_NBFORMAT_MINOR
                    );
                }
                Ok(notebook)
            }
            // v2 already has the worksheet layout v3 kept
            2 | 3 => {
                let legacy: NotebookV3 = serde_json::from_value(value).map_err(|source| {
                    ConversionError::Schema {
                        version: version as u32,
                        source,
                    }
                })?;
                Ok(legacy.upgrade())
            }
            1 => {
                let legacy: NotebookV1 = serde_json::from_value(value)
                    .map_err(|source| ConversionError::Schema { version: 1, source })?;
                Ok(legacy.upgrade())
            }
            other => Err(ConversionError::UnsupportedVersion(other)),
        }
    }

    /// Kernel language, if the document declares one
    pub fn language(&self) -> Option<&str> {
        let from_info = self
            .metadata
            .language_info
            .as_ref()
            .map(|info| info.name.as_str())
            .filter(|name| !name.is_empty());

        from_info.or_else(|| {
            self.metadata
                .kernelspec
                .as_ref()
                .and_then(|spec| spec.language.as_deref())
                .filter(|name| !name.is_empty())
        })
    }

    /// Code cells in document order
    pub fn code_cells(&self) -> impl Iterator<Item = &CodeCell> {
        self.cells.iter().filter_map(|cell| match cell {
            Cell::Code(code) => Some(code),
            _ => None,
        })
    }
}

#[derive(Deserialize)]
struct NotebookV3 {
    #[serde(default)]
    worksheets: Vec<WorksheetV3>,
}

#[derive(Deserialize)]
struct WorksheetV3 {
    #[serde(default)]
    cells: Vec<CellV3>,
}

#[derive(Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
enum CellV3 {
    Code {
        #[serde(default)]
        input: MultilineString,
        #[serde(default)]
        prompt_number: Option<u32>,
        #[serde(default)]
        language: Option<String>,
    },
    Markdown,
    Heading,
    Raw,
    #[serde(other)]
    Other,
}

impl NotebookV3 {
    /// Flatten worksheets into one cell list and move v3 fields to their v4 homes
    fn upgrade(self) -> Notebook {
        let mut language = None;
        let mut cells = Vec::new();

        for cell in self.worksheets.into_iter().flat_map(|ws| ws.cells) {
            match cell {
                CellV3::Code {
                    input,
                    prompt_number,
                    language: cell_language,
                } => {
                    if language.is_none() {
                        language = cell_language;
                    }
                    cells.push(Cell::Code(CodeCell {
                        source: input,
                        execution_count: prompt_number,
                    }));
                }
                CellV3::Markdown | CellV3::Heading => cells.push(Cell::Markdown),
                CellV3::Raw => cells.push(Cell::Raw),
                CellV3::Other => {}
            }
        }

        Notebook {
            nbformat: CURRENT_NBFORMAT,
            nbformat_minor: 0,
            metadata: NotebookMetadata {
                kernelspec: None,
                language_info: language.map(|name| LanguageInfo {
                    name,
                    file_extension: None,
                }),
            },
            cells,
        }
    }
}

#[derive(Deserialize)]
struct NotebookV1 {
    #[serde(default)]
    cells: Vec<CellV1>,
}

#[derive(Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
enum CellV1 {
    Code {
        #[serde(default)]
        code: MultilineString,
        #[serde(default)]
        prompt_number: Option<u32>,
    },
    Text,
    #[serde(other)]
    Other,
}

impl NotebookV1 {
    fn upgrade(self) -> Notebook {
        let cells = self
            .cells
            .into_iter()
            .filter_map(|cell| match cell {
                CellV1::Code {
                    code,
                    prompt_number,
                } => Some(Cell::Code(CodeCell {
                    source: code,
                    execution_count: prompt_number,
                })),
                CellV1::Text => Some(Cell::Markdown),
                CellV1::Other => None,
            })
            .collect();

        Notebook {
            nbformat: CURRENT_NBFORMAT,
            nbformat_minor: 0,
            metadata: NotebookMetadata::default(),
            cells,
        }
    }
}
