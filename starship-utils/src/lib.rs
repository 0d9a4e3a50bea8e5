//! Repository Starship utilities
//!
//! Shared plumbing for the analysis crates: logging setup, configuration
//! file loading and the uniform path filters applied while walking a
//! source tree.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod file;
pub mod logging;

pub use config::{load_config, parse_config, ConfigFormat};
pub use file::{normalize_path, relative_path_string, PathFilter};

/// Result type used throughout the utilities crate
pub type Result<T> = std::result::Result<T, UtilError>;

/// Error types for utility operations
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid glob or path pattern
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Directory names skipped while walking a tree.
///
/// Covers version-control metadata, bytecode and build caches, and
/// dependency-installation directories.
pub fn default_excluded_directories() -> std::collections::HashSet<&'static str> {
    [
        // Version control
        ".git",
        ".hg",
        ".svn",
        // Bytecode / build caches
        "__pycache__",
        ".pytest_cache",
        ".mypy_cache",
        ".ruff_cache",
        ".tox",
        ".nox",
        "build",
        "dist",
        // Dependency installation
        "node_modules",
        "venv",
        ".venv",
        "env",
        "site-packages",
    ]
    .into_iter()
    .collect()
}

/// Check whether a file name follows the test-file naming convention
pub fn is_test_file_name(file_name: &str) -> bool {
    let stem = file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem);
    stem.starts_with("test_") || stem.ends_with("_test")
}
