//! Starship Core - Structural-Health Analysis Engine
//!
//! This crate provides the analysis pipeline behind Repository Starship:
//! - A pluggable parser capability producing a normalized symbol table
//! - Complexity, dependency, documentation and YAGNI analyzers
//! - Module aggregation with composite health scores
//! - A deterministic 3-D layout of modules for visualization

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc
)]

pub mod analysis;
pub mod constants;
pub mod extractors;
pub mod graph;
pub mod models;
pub mod parsers;

pub use analysis::{
    analyze_complexity, analyze_dependencies, analyze_documentation, analyze_repository,
    analyze_structure, detect_yagni, AnalysisOrchestrator,
};
pub use constants::{HeuristicPolicy, ModuleTypePolicy};
pub use models::{AnalysisResult, Module, ModuleType, SourceSnapshot, VulnerabilityCounts};
pub use parsers::{ParserRegistry, SourceLanguage, SourceParser};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result type used throughout Starship core
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Starship core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Analysis error
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Utility error
    #[error("Utility error: {0}")]
    Util(#[from] starship_utils::UtilError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options of the spatial layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Seed of the per-axis jitter; `None` disables jitter
    pub jitter_seed: Option<u64>,
    /// Maximum jitter per axis, in [0, 1]
    pub jitter_amplitude: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            jitter_seed: None,
            jitter_amplitude: 1.0,
        }
    }
}

/// Configuration of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Extra glob patterns excluded from the inventory
    pub exclude_patterns: Vec<String>,
    /// Skip `test_*` and `*_test` files
    pub exclude_tests: bool,
    /// Directories whose contents are importable without their own prefix
    pub source_roots: Vec<String>,
    /// Length of the most-imported ranking
    pub most_imported_limit: usize,
    /// Attach the raw analyzer payloads to the result
    pub include_details: bool,
    /// Caller-supplied vulnerability counts
    pub vulnerabilities: VulnerabilityCounts,
    pub heuristics: HeuristicPolicy,
    pub module_types: ModuleTypePolicy,
    pub layout: LayoutOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: Vec::new(),
            exclude_tests: true,
            source_roots: vec!["src".to_string()],
            most_imported_limit: 5,
            include_details: true,
            vulnerabilities: VulnerabilityCounts::default(),
            heuristics: HeuristicPolicy::default(),
            module_types: ModuleTypePolicy::default(),
            layout: LayoutOptions::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration file (TOML, JSON or YAML) and validate it
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: Self = starship_utils::load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the analyzers cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.most_imported_limit == 0 {
            return Err(Error::Config("most_imported_limit must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.layout.jitter_amplitude) {
            return Err(Error::Config(format!(
                "layout.jitter_amplitude must be in [0, 1], got {}",
                self.layout.jitter_amplitude
            )));
        }
        if self.source_roots.iter().any(|root| root.trim_matches('/').is_empty()) {
            return Err(Error::Config("source_roots entries must not be empty".to_string()));
        }
        self.heuristics.validate().map_err(Error::Config)?;
        // Compiles the globs so bad patterns fail before any file is read
        starship_utils::PathFilter::new(&self.exclude_patterns, self.exclude_tests)?;
        Ok(())
    }
}
