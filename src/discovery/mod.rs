//! Notebook discovery
//!
//! Finds the notebooks directly inside a directory. Subdirectories are not
//! searched; hidden files and files carrying the skip marker are left out.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default notebook file extension
pub const NOTEBOOK_EXTENSION: &str = "ipynb";

/// Default substring that excludes a notebook from discovery
pub const DEFAULT_SKIP_MARKER: &str = "skiptest";

/// Directory enumeration failures; these abort the run
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Failed to read directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Notebook selection rules
#[derive(Clone, Debug)]
pub struct Discovery {
    extension: String,
    skip_marker: Option<String>,
}

impl Default for Discovery {
    fn default() -> Self {
        Self::new()
    }
}

impl Discovery {
    pub fn new() -> Self {
        Self {
            extension: NOTEBOOK_EXTENSION.to_string(),
            skip_marker: Some(DEFAULT_SKIP_MARKER.to_string()),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set the skip marker; an empty marker disables skipping
    pub fn with_skip_marker(mut self, marker: Option<String>) -> Self {
        self.skip_marker = marker.filter(|m| !m.is_empty());
        self
    }

    pub fn skip_marker(&self) -> Option<&str> {
        self.skip_marker.as_deref()
    }

    /// Whether a file name is selected
    pub fn matches(&self, file_name: &str) -> bool {
        if file_name.starts_with('.') {
            return false;
        }

        let has_extension = Path::new(file_name)
            .extension()
            .map(|ext| ext == self.extension.as_str())
            .unwrap_or(false);
        if !has_extension {
            return false;
        }

        match &self.skip_marker {
            Some(marker) => !file_name.contains(marker.as_str()),
            None => true,
        }
    }

    /// List matching notebooks directly inside `dir`, sorted by file name
    pub fn discover(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, DiscoveryError> {
        let dir = dir.as_ref();
        let read_err = |source| DiscoveryError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut found = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if self.matches(name) {
                found.push(path);
            } else {
                debug!("Ignoring {}", path.display());
            }
        }

        found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_matches() {
        let discovery = Discovery::new();
        assert!(discovery.matches("good.ipynb"));
        assert!(!discovery.matches("good.py"));
        assert!(!discovery.matches("slow_skiptest.ipynb"));
        assert!(!discovery.matches(".hidden.ipynb"));
        assert!(!discovery.matches("ipynb"));
    }

    #[test]
    fn test_empty_skip_marker_disables_filter() {
        let discovery = Discovery::new().with_skip_marker(Some(String::new()));
        assert_eq!(discovery.skip_marker(), None);
        assert!(discovery.matches("slow_skiptest.ipynb"));
    }

    #[test]
    fn test_discover_top_level_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.ipynb"), "{}").unwrap();
        fs::write(dir.path().join("a.ipynb"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join("broken_skiptest.ipynb"), "{}").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.ipynb"), "{}").unwrap();
        fs::create_dir(dir.path().join("dir.ipynb")).unwrap();

        let found = Discovery::new().discover(dir.path()).unwrap();
        assert_eq!(names(&found), vec!["a.ipynb", "b.ipynb"]);
    }

    #[test]
    fn test_discover_empty_dir() {
        let dir = tempdir().unwrap();
        let found = Discovery::new().discover(dir.path()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_discover_missing_dir() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = Discovery::new().discover(&missing).unwrap_err();
        assert!(matches!(err, DiscoveryError::ReadDir { .. }));
    }

    #[test]
    fn test_custom_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.ipynb"), "{}").unwrap();
        fs::write(dir.path().join("b.nb"), "{}").unwrap();

        let found = Discovery::new()
            .with_extension("nb")
            .discover(dir.path())
            .unwrap();
        assert_eq!(names(&found), vec!["b.nb"]);
    }
}
