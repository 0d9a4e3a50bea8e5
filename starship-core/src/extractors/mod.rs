//! Data extractors for Starship analysis
//!
//! [`SourceInventory`] walks a tree once and produces the immutable
//! [`SourceSnapshot`]; every analyzer then implements [`Analyzer`] over that
//! snapshot. Per-file work runs on rayon and folds into private
//! accumulators that are merged once.

pub mod complexity;
pub mod dependencies;
pub mod documentation;
pub mod structure;
pub mod yagni;

pub use complexity::{ComplexityAnalyzer, ComplexityReport};
pub use dependencies::{DependencyAnalyzer, DependencyReport};
pub use documentation::{DocumentationAnalyzer, DocumentationReport};
pub use structure::{StructureAnalyzer, StructureReport};
pub use yagni::{YagniDetector, YagniReport};

use crate::models::{FileError, FileErrorKind, SourceFile, SourceSnapshot};
use crate::parsers::{ParserRegistry, SourceParser};
use crate::{AnalysisConfig, Error, Result};
use rayon::prelude::*;
use starship_utils::{normalize_path, relative_path_string, PathFilter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One analysis over a shared snapshot
pub trait Analyzer {
    type Report: Send + 'static;

    /// Analyzer name used in logs
    fn name(&self) -> &'static str;

    fn analyze(&self, snapshot: &SourceSnapshot) -> Result<Self::Report>;
}

/// Source Inventory Extractor
#[derive(Debug, Clone)]
pub struct SourceInventory {
    root: PathBuf,
    filter: PathFilter,
    registry: ParserRegistry,
}

impl SourceInventory {
    /// Fails with [`Error::Config`] when `root` is not an existing directory
    pub fn new(root: impl AsRef<Path>, config: &AnalysisConfig) -> Result<Self> {
        Self::with_registry(root, config, ParserRegistry::with_defaults())
    }

    pub fn with_registry(
        root: impl AsRef<Path>,
        config: &AnalysisConfig,
        registry: ParserRegistry,
    ) -> Result<Self> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(Error::Config(format!(
                "codebase path does not exist: {}",
                root.display()
            )));
        }
        if !root.is_dir() {
            return Err(Error::Config(format!(
                "codebase path is not a directory: {}",
                root.display()
            )));
        }

        Ok(Self {
            root: normalize_path(root),
            filter: PathFilter::new(&config.exclude_patterns, config.exclude_tests)?,
            registry,
        })
    }

    /// Walk, filter and parse every source file
    pub fn extract(&self) -> Result<SourceSnapshot> {
        let candidates = self.collect_candidates();
        debug!(count = candidates.len(), root = %self.root.display(), "source files discovered");

        let mut files: Vec<SourceFile> = candidates
            .into_par_iter()
            .map(|(relative, absolute, parser)| load_file(relative, &absolute, parser.as_ref()))
            .collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let failed = files.iter().filter(|file| file.error.is_some()).count();
        info!(files = files.len(), failed, "source inventory complete");

        Ok(SourceSnapshot {
            root_name: root_display_name(&self.root),
            root: self.root.clone(),
            files,
        })
    }

    fn collect_candidates(&self) -> Vec<(String, PathBuf, Arc<dyn SourceParser>)> {
        let mut candidates = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !self.filter.is_excluded_dir(&entry.file_name().to_string_lossy())
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(parser) = self.registry.parser_for(entry.path()) else {
                continue;
            };
            let relative = relative_path_string(&self.root, entry.path());
            if self.filter.is_excluded(&relative) {
                continue;
            }
            candidates.push((relative, entry.into_path(), parser));
        }
        candidates
    }
}

fn load_file(relative: String, absolute: &Path, parser: &dyn SourceParser) -> SourceFile {
    let language = parser.language();
    let content = match std::fs::read_to_string(absolute) {
        Ok(content) => content,
        Err(e) => {
            warn!(file = %relative, error = %e, "failed to read source file");
            return SourceFile {
                error: Some(FileError {
                    file: relative.clone(),
                    kind: FileErrorKind::Io,
                    message: e.to_string(),
                }),
                path: relative,
                language,
                line_count: 0,
                symbols: None,
            };
        }
    };

    let line_count = content.lines().count();
    match parser.parse(absolute, &content) {
        Ok(symbols) => {
            debug!(file = %relative, functions = symbols.functions.len(), "parsed");
            SourceFile {
                path: relative,
                language,
                line_count,
                symbols: Some(symbols),
                error: None,
            }
        }
        Err(e) => {
            warn!(file = %relative, error = %e, "failed to parse source file");
            SourceFile {
                error: Some(FileError {
                    file: relative.clone(),
                    kind: FileErrorKind::Parse,
                    message: e.to_string(),
                }),
                path: relative,
                language,
                line_count,
                symbols: None,
            }
        }
    }
}

fn root_display_name(root: &Path) -> String {
    let resolved = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    resolved
        .file_name()
        .map_or_else(|| "root".to_string(), |name| name.to_string_lossy().into_owned())
}

/// `part / whole * 100`, 0 when `whole` is 0
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
