//! Analysis Result Model
//!
//! The single structured outcome of a repository analysis.

use super::module::Module;
use super::source_file::FileError;
use crate::extractors::complexity::ComplexityReport;
use crate::extractors::dependencies::DependencyReport;
use crate::extractors::documentation::DocumentationReport;
use crate::extractors::yagni::YagniReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-supplied vulnerability placeholders; nothing is scanned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VulnerabilityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl VulnerabilityCounts {
    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Repository-level metrics map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMetrics {
    /// Complexity score in [0, 100], higher is simpler
    pub complexity: f64,
    /// Documentation score in [0, 100]
    pub documentation: f64,
    /// YAGNI score in [0, 100]
    pub yagni: f64,
    /// Distinct import targets per file, summed over files
    pub dependencies: usize,
    /// Coupling score in [0, 100], higher is looser
    pub coupling: f64,
    /// Technical debt in [0, 100], higher is worse
    pub tech_debt: f64,
    pub unique_external_dependencies: usize,
    pub vulnerabilities: VulnerabilityCounts,
    pub circular_dependencies: usize,
    /// Size-weighted mean of module health
    pub overall_health: f64,
    /// Files that parsed and entered the aggregates
    pub files_analyzed: usize,
}

/// Raw analyzer payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDetails {
    pub complexity: ComplexityReport,
    pub dependencies: DependencyReport,
    pub documentation: DocumentationReport,
    pub yagni: YagniReport,
}

/// Complete analysis result for a codebase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Path to the analyzed codebase
    pub codebase_path: String,
    /// Number of inventoried files, failed ones included
    pub files_analyzed: usize,
    /// Timestamp when analysis was performed
    pub analysis_timestamp: DateTime<Utc>,
    /// Duration of analysis in seconds
    pub analysis_duration: f64,

    pub metrics: RepositoryMetrics,
    pub modules: Vec<Module>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<AnalysisDetails>,
    /// Per-file read and parse failures
    pub errors: Vec<FileError>,
}

impl AnalysisResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|module| module.id == id)
    }
}
