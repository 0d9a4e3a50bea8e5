//! Documentation Coverage Scorer
//!
//! Docstring presence and quality per entity, coverage per entity kind,
//! comment density and a README check.

use super::{percentage, Analyzer};
use crate::constants::DocumentationThresholds as Doc;
use crate::models::{SourceFile, SourceSnapshot, SymbolKind, SymbolTable};
use crate::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

const README_NAMES: &[&str] = &["README.md", "README.rst", "README.txt", "README"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocQuality {
    Good,
    Adequate,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocstringQuality {
    pub score: u32,
    pub quality: DocQuality,
    pub word_count: usize,
    pub has_params: bool,
    pub has_returns: bool,
    pub has_raises: bool,
}

/// Score a docstring; `None` for an empty one
pub fn docstring_quality(docstring: &str) -> Option<DocstringQuality> {
    if docstring.trim().is_empty() {
        return None;
    }
    let lower = docstring.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|keyword| lower.contains(keyword));

    let word_count = docstring.split_whitespace().count();
    let has_params = mentions(Doc::PARAMETER_KEYWORDS);
    let has_returns = mentions(Doc::RETURN_KEYWORDS);
    let has_raises = mentions(Doc::EXCEPTION_KEYWORDS);

    let mut score = Doc::BASE_POINTS;
    if word_count > Doc::MIN_WORDS {
        score += Doc::LENGTH_POINTS;
    }
    if has_params {
        score += Doc::PARAMETER_POINTS;
    }
    if has_returns {
        score += Doc::RETURN_POINTS;
    }
    if has_raises {
        score += Doc::EXCEPTION_POINTS;
    }

    let quality = if score >= Doc::GOOD_QUALITY {
        DocQuality::Good
    } else if score >= Doc::ADEQUATE_QUALITY {
        DocQuality::Adequate
    } else {
        DocQuality::Poor
    };

    Some(DocstringQuality { score, quality, word_count, has_params, has_returns, has_raises })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageCounts {
    pub documented: usize,
    pub undocumented: usize,
}

impl CoverageCounts {
    fn record(&mut self, documented: bool) {
        if documented {
            self.documented += 1;
        } else {
            self.undocumented += 1;
        }
    }

    fn merge(&mut self, other: Self) {
        self.documented += other.documented;
        self.undocumented += other.undocumented;
    }

    /// Percentage documented, 0 with no entities
    pub fn coverage(&self) -> f64 {
        percentage(self.documented, self.documented + self.undocumented)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDoc {
    pub name: String,
    pub has_docstring: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDoc {
    pub name: String,
    pub kind: SymbolKind,
    pub line: usize,
    pub has_docstring: bool,
    pub quality: Option<DocstringQuality>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub methods: Vec<MethodDoc>,
}

/// Documentation facts of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDocumentation {
    pub path: String,
    pub module_docstring: bool,
    pub functions: CoverageCounts,
    pub classes: CoverageCounts,
    pub total_lines: usize,
    pub comment_lines: usize,
    pub entities: Vec<EntityDoc>,
}

impl FileDocumentation {
    fn from_file(file: &SourceFile, symbols: &SymbolTable) -> Self {
        let mut doc = Self {
            path: file.path.clone(),
            module_docstring: symbols.module_docstring.is_some(),
            functions: CoverageCounts::default(),
            classes: CoverageCounts::default(),
            total_lines: symbols.raw.loc,
            comment_lines: symbols.raw.comments,
            entities: Vec::new(),
        };

        for function in &symbols.functions {
            let quality = function.docstring.as_deref().and_then(docstring_quality);
            doc.functions.record(quality.is_some());
            doc.entities.push(EntityDoc {
                name: function.name.clone(),
                kind: SymbolKind::Function,
                line: function.line,
                has_docstring: quality.is_some(),
                quality,
                methods: Vec::new(),
            });
        }
        for class in &symbols.classes {
            let quality = class.docstring.as_deref().and_then(docstring_quality);
            doc.classes.record(quality.is_some());
            doc.entities.push(EntityDoc {
                name: class.name.clone(),
                kind: SymbolKind::Class,
                line: class.line,
                has_docstring: quality.is_some(),
                quality,
                methods: class
                    .methods
                    .iter()
                    .map(|method| MethodDoc {
                        name: method.name.clone(),
                        has_docstring: method.docstring.is_some(),
                    })
                    .collect(),
            });
        }
        doc.entities.sort_by_key(|entity| entity.line);
        doc
    }
}

/// Merged counts behind the documentation score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationTotals {
    pub functions: CoverageCounts,
    pub classes: CoverageCounts,
    pub modules: CoverageCounts,
    pub total_lines: usize,
    pub comment_lines: usize,
}

impl DocumentationTotals {
    pub fn from_files<'a>(files: impl IntoIterator<Item = &'a FileDocumentation>) -> Self {
        let mut totals = Self::default();
        for file in files {
            totals.functions.merge(file.functions);
            totals.classes.merge(file.classes);
            totals.modules.record(file.module_docstring);
            totals.total_lines += file.total_lines;
            totals.comment_lines += file.comment_lines;
        }
        totals
    }

    /// Comment lines as a percentage of all lines
    pub fn comment_density(&self) -> f64 {
        percentage(self.comment_lines, self.total_lines)
    }

    /// Weighted coverage plus the capped comment bonus, in [0, 100]
    pub fn overall_score(&self) -> f64 {
        let comment_bonus =
            (self.comment_density() * Doc::COMMENT_DENSITY_FACTOR).min(Doc::COMMENT_BONUS_CAP);
        (Doc::FUNCTION_WEIGHT * self.functions.coverage()
            + Doc::CLASS_WEIGHT * self.classes.coverage()
            + Doc::MODULE_WEIGHT * self.modules.coverage()
            + comment_bonus)
            .clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadmeAnalysis {
    pub exists: bool,
    pub file: Option<String>,
    pub size: usize,
    pub word_count: usize,
    pub has_installation: bool,
    pub has_usage: bool,
    pub has_api: bool,
    pub has_contributing: bool,
}

/// Inspect the first README found directly under `root`
pub fn analyze_readme(root: &Path) -> ReadmeAnalysis {
    for name in README_NAMES {
        let path = root.join(name);
        if !path.is_file() {
            continue;
        }
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %name, error = %e, "failed to read README");
                continue;
            }
        };
        let lower = content.to_lowercase();
        return ReadmeAnalysis {
            exists: true,
            file: Some((*name).to_string()),
            size: content.chars().count(),
            word_count: content.split_whitespace().count(),
            has_installation: lower.contains("install"),
            has_usage: lower.contains("usage") || lower.contains("example"),
            has_api: lower.contains("api"),
            has_contributing: lower.contains("contribut"),
        };
    }
    ReadmeAnalysis::default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationReport {
    pub function_coverage: f64,
    pub class_coverage: f64,
    pub module_coverage: f64,
    /// Comment lines per hundred lines
    pub comment_density: f64,
    pub overall_score: f64,
    pub totals: DocumentationTotals,
    pub quality_distribution: BTreeMap<DocQuality, usize>,
    pub readme: ReadmeAnalysis,
    pub files: Vec<FileDocumentation>,
}

impl DocumentationReport {
    pub fn file(&self, path: &str) -> Option<&FileDocumentation> {
        self.files
            .binary_search_by(|file| file.path.as_str().cmp(path))
            .ok()
            .map(|index| &self.files[index])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentationAnalyzer;

impl Analyzer for DocumentationAnalyzer {
    type Report = DocumentationReport;

    fn name(&self) -> &'static str {
        "documentation"
    }

    fn analyze(&self, snapshot: &SourceSnapshot) -> Result<DocumentationReport> {
        let mut files: Vec<FileDocumentation> = snapshot
            .files
            .par_iter()
            .filter_map(|file| file.parsed().map(|symbols| FileDocumentation::from_file(file, symbols)))
            .collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let totals = DocumentationTotals::from_files(&files);
        let mut quality_distribution = BTreeMap::new();
        for quality in files
            .iter()
            .flat_map(|file| &file.entities)
            .filter_map(|entity| entity.quality.as_ref())
        {
            *quality_distribution.entry(quality.quality).or_insert(0) += 1;
        }

        let report = DocumentationReport {
            function_coverage: totals.functions.coverage(),
            class_coverage: totals.classes.coverage(),
            module_coverage: totals.modules.coverage(),
            comment_density: totals.comment_density(),
            overall_score: totals.overall_score(),
            totals,
            quality_distribution,
            readme: analyze_readme(&snapshot.root),
            files,
        };
        info!(
            function_coverage = report.function_coverage,
            overall = report.overall_score,
            "documentation analysis complete"
        );
        Ok(report)
    }
}
