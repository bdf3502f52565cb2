//! In-memory source file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::plugin::normalize_extension;

/// A source file read once and split into lines.
///
/// Extractors and the parameter scanner all slice the same buffer.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub lines: Vec<String>,
}

impl SourceFile {
    /// Read a file from disk. Invalid UTF-8 is replaced rather than rejected.
    pub fn read(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        Ok(Self::from_source(path, &String::from_utf8_lossy(&bytes)))
    }

    pub fn from_source(path: impl Into<PathBuf>, source: &str) -> Self {
        Self {
            path: path.into(),
            lines: source.lines().map(str::to_string).collect(),
        }
    }

    /// Lower-case extension with a leading dot, or an empty string.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|ext| normalize_extension(&ext.to_string_lossy()))
            .unwrap_or_default()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Lines paired with their 1-based numbers.
    pub fn numbered_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines.iter().enumerate().map(|(i, line)| (i + 1, line.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_and_lines() {
        let file = SourceFile::from_source("src/App.JS", "a\r\nb\n");
        assert_eq!(file.extension(), ".js");
        assert_eq!(file.lines, vec!["a", "b"]);
        assert_eq!(file.numbered_lines().last(), Some((2, "b")));
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(SourceFile::from_source("Makefile", "").extension(), "");
    }
}
