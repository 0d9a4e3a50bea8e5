//! Source inventory: one immutable snapshot of the analyzed tree

use super::symbols::SymbolTable;
use crate::parsers::SourceLanguage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Why a file was left out of the aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileErrorKind {
    /// The file could not be read
    Io,
    /// The parser rejected the file
    Parse,
}

/// Per-file failure embedded in the analysis result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub file: String,
    pub kind: FileErrorKind,
    pub message: String,
}

/// One inventoried file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the snapshot root, `/` separated
    pub path: String,
    pub language: SourceLanguage,
    pub line_count: usize,
    pub symbols: Option<SymbolTable>,
    pub error: Option<FileError>,
}

impl SourceFile {
    /// Symbol table of a successfully parsed file
    pub fn parsed(&self) -> Option<&SymbolTable> {
        if self.error.is_some() {
            return None;
        }
        self.symbols.as_ref()
    }

    /// Top-level path segment, or `None` for files directly under the root
    pub fn top_level_dir(&self) -> Option<&str> {
        self.path.split_once('/').map(|(dir, _)| dir)
    }
}

/// Read-only view of every inventoried file, ordered by path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    pub root: PathBuf,
    /// Display name of the root directory
    pub root_name: String,
    pub files: Vec<SourceFile>,
}

impl SourceSnapshot {
    /// Files that parsed cleanly, with their symbol tables
    pub fn parsed_files(&self) -> impl Iterator<Item = (&SourceFile, &SymbolTable)> + '_ {
        self.files
            .iter()
            .filter_map(|file| file.parsed().map(|symbols| (file, symbols)))
    }

    pub fn parsed_count(&self) -> usize {
        self.parsed_files().count()
    }

    pub fn errors(&self) -> Vec<FileError> {
        self.files.iter().filter_map(|file| file.error.clone()).collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files
            .binary_search_by(|file| file.path.as_str().cmp(path))
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, error: bool) -> SourceFile {
        SourceFile {
            path: path.to_string(),
            language: SourceLanguage::Python,
            line_count: 10,
            symbols: Some(SymbolTable::default()),
            error: error.then(|| FileError {
                file: path.to_string(),
                kind: FileErrorKind::Parse,
                message: "syntax error".to_string(),
            }),
        }
    }

    #[test]
    fn test_failed_files_are_not_parsed() {
        let snapshot = SourceSnapshot {
            root: PathBuf::from("/repo"),
            root_name: "repo".to_string(),
            files: vec![file("a.py", false), file("b.py", true)],
        };
        assert_eq!(snapshot.parsed_count(), 1);
        assert_eq!(snapshot.errors().len(), 1);
        assert!(snapshot.contains("b.py"));
        assert!(!snapshot.contains("c.py"));
    }

    #[test]
    fn test_top_level_dir() {
        assert_eq!(file("pkg/sub/mod.py", false).top_level_dir(), Some("pkg"));
        assert_eq!(file("setup.py", false).top_level_dir(), None);
    }
}
