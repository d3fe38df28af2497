//! Script exporter
//!
//! Turns a notebook into one block of executable source. Code cells are
//! emitted in document order behind `# In[n]:` markers; markdown, raw cells
//! and stored outputs are dropped.

use tracing::{debug, warn};

use super::document::Notebook;

const DEFAULT_LANGUAGE: &str = "python";

/// Exported source plus what the exporter learned while producing it
#[derive(Clone, Debug)]
pub struct ExportedScript {
    pub source: String,
    pub metadata: ExportMetadata,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportMetadata {
    pub language: String,
    pub file_extension: String,
    pub code_cells: usize,
    pub skipped_cells: usize,
}

/// Notebook to script exporter
#[derive(Clone, Debug)]
pub struct ScriptExporter {
    include_header: bool,
}

impl Default for ScriptExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptExporter {
    pub fn new() -> Self {
        Self {
            include_header: true,
        }
    }

    /// Omit the interpreter/coding header lines
    pub fn without_header(mut self) -> Self {
        self.include_header = false;
        self
    }

    /// Export the code cells of a notebook
    pub fn export(&self, notebook: &Notebook) -> ExportedScript {
        let language = notebook.language().unwrap_or(DEFAULT_LANGUAGE).to_string();
        let is_python = language.eq_ignore_ascii_case(DEFAULT_LANGUAGE);

        let mut source = String::new();
        if self.include_header {
            source.push_str(&format!("#!/usr/bin/env {language}\n# coding: utf-8\n\n"));
        }

        let mut code_cells = 0;
        let mut skipped_cells = 0;

        for cell in notebook.code_cells() {
            let text = cell.source.joined();
            if text.trim().is_empty() {
                continue;
            }

            let body = if is_python {
                if is_cell_magic(&text) {
                    warn!("Skipping cell magic: {}", first_line(&text));
                    skipped_cells += 1;
                    continue;
                }
                neutralize_magics(&text)
            } else {
                text
            };

            let counter = cell
                .execution_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| " ".to_string());

            source.push_str(&format!("# In[{counter}]:\n\n\n"));
            source.push_str(body.trim_end());
            source.push_str("\n\n\n");
            code_cells += 1;
        }

        let file_extension = notebook
            .metadata
            .language_info
            .as_ref()
            .and_then(|info| info.file_extension.clone())
            .unwrap_or_else(|| {
                if is_python {
                    ".py".to_string()
                } else {
                    ".txt".to_string()
                }
            });

        debug!(
            "Exported {} code cells ({} skipped) from nbformat {}.{} as {}",
            code_cells, skipped_cells, notebook.nbformat, notebook.nbformat_minor, language
        );

        ExportedScript {
            source,
            metadata: ExportMetadata {
                language,
                file_extension,
                code_cells,
                skipped_cells,
            },
        }
    }
}

fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

fn is_cell_magic(text: &str) -> bool {
    first_line(text).starts_with("%%")
}

/// Replace IPython line magics and shell escapes with `pass` so the
/// surrounding block structure still parses. Only lines that begin a new
/// statement are candidates; continuation lines and string bodies are kept.
fn neutralize_magics(text: &str) -> String {
    let mut scanner = LineScanner::default();
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let is_magic = trimmed.starts_with('%') || trimmed.starts_with('!');
            if is_magic && scanner.at_statement_start() {
                let indent = &line[..line.len() - trimmed.len()];
                format!("{indent}pass  # {trimmed}")
            } else {
                scanner.advance(line);
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const TRIPLE_DOUBLE: &str = "\"\"\"";
const TRIPLE_SINGLE: &str = "'''";

/// Tracks just enough Python lexical state to tell where logical lines begin
#[derive(Debug, Default)]
struct LineScanner {
    depth: usize,
    open_string: Option<&'static str>,
    continued: bool,
}

impl LineScanner {
    fn at_statement_start(&self) -> bool {
        self.depth == 0 && self.open_string.is_none() && !self.continued
    }

    fn advance(&mut self, line: &str) {
        self.continued = false;
        let mut rest = line;

        loop {
            if let Some(quote) = self.open_string {
                match closing_quote(rest, quote) {
                    Some(end) => {
                        rest = &rest[end..];
                        self.open_string = None;
                    }
                    None => return,
                }
            }

            let Some((i, c)) = rest.char_indices().find(|(_, c)| {
                matches!(c, '#' | '\'' | '"' | '(' | '[' | '{' | ')' | ']' | '}' | '\\')
            }) else {
                return;
            };

            match c {
                '#' => return,
                '\\' => {
                    if rest[i + 1..].is_empty() {
                        self.continued = true;
                        return;
                    }
                    rest = &rest[i + 1..];
                }
                '(' | '[' | '{' => {
                    self.depth += 1;
                    rest = &rest[i + 1..];
                }
                ')' | ']' | '}' => {
                    self.depth = self.depth.saturating_sub(1);
                    rest = &rest[i + 1..];
                }
                _ => {
                    let triple = if c == '"' { TRIPLE_DOUBLE } else { TRIPLE_SINGLE };
                    if rest[i..].starts_with(triple) {
                        self.open_string = Some(triple);
                        rest = &rest[i + 3..];
                        continue;
                    }
                    let single = if c == '"' { "\"" } else { "'" };
                    match closing_quote(&rest[i + 1..], single) {
                        Some(end) => rest = &rest[i + 1 + end..],
                        // Unterminated single-quoted string ends with the line
                        None => return,
                    }
                }
            }
        }
    }
}

/// Byte offset just past the closing `quote`, honouring backslash escapes
fn closing_quote(text: &str, quote: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if text[i..].starts_with(quote) {
            return Some(i + quote.len());
        }
    }
    None
}
