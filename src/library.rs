use std::path::{Path, PathBuf};

use crate::error::LibraryError;

/// The song list shown to the user.
///
/// Only an ordered list of paths: no ordering rules, no current-track
/// cursor and no next/previous logic.
#[derive(Debug, Clone)]
pub struct TrackList {
    entries: Vec<PathBuf>,
    extension: String,
}

impl TrackList {
    /// Track list whose add filter accepts `extension` (without the dot)
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            extension: extension.into().trim_start_matches('.').to_lowercase(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Change the add filter; entries already in the list stay
    pub fn set_extension(&mut self, extension: &str) {
        self.extension = extension.trim_start_matches('.').to_lowercase();
    }

    /// Whether the add-file filter accepts `path`
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }

    /// Append a file and return its index
    pub fn add(&mut self, path: impl Into<PathBuf>) -> Result<usize, LibraryError> {
        let path = path.into();
        if !self.accepts(&path) {
            return Err(LibraryError::UnsupportedExtension {
                path: path.display().to_string(),
                expected: self.extension.clone(),
            });
        }
        self.entries.push(path);
        Ok(self.entries.len() - 1)
    }

    pub fn select(&self, index: usize) -> Result<&Path, LibraryError> {
        self.entries
            .get(index)
            .map(PathBuf::as_path)
            .ok_or(LibraryError::InvalidIndex { index })
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name shown in the list: the file name, falling back to the full path
    pub fn display_name(path: &Path) -> String {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string())
    }
}

impl Default for TrackList {
    fn default() -> Self {
        Self::new("mp3")
    }
}
