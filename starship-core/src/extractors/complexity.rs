//! Complexity Scorer
//!
//! McCabe complexity per function and the maintainability index per file.

use super::Analyzer;
use crate::constants::{ComplexityRank, ComplexityThresholds, MaintainabilityRank};
use crate::models::{RawMetrics, SourceFile, SourceSnapshot, SymbolTable};
use crate::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Complexity of one function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionComplexity {
    pub file: String,
    pub name: String,
    pub class_name: Option<String>,
    pub line: usize,
    pub complexity: usize,
    pub rank: ComplexityRank,
}

/// Complexity and maintainability of one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileComplexity {
    pub path: String,
    /// Module-level branch points plus every function's complexity
    pub complexity: usize,
    /// Sum of function complexities only
    pub function_complexity: usize,
    pub function_count: usize,
    pub maintainability_index: f64,
    pub maintainability_rank: MaintainabilityRank,
    pub halstead_volume: f64,
    pub raw: RawMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityReport {
    pub files_analyzed: usize,
    pub total_functions: usize,
    pub total_complexity: usize,
    /// Total function complexity per parsed file
    pub avg_complexity: f64,
    pub max_complexity: usize,
    /// `clamp(100 - avg_complexity * 5, 0, 100)`
    pub complexity_score: f64,
    pub avg_maintainability_index: f64,
    pub rank_distribution: BTreeMap<ComplexityRank, usize>,
    pub high_complexity_functions: Vec<FunctionComplexity>,
    pub raw_totals: RawMetrics,
    pub files: Vec<FileComplexity>,
}

impl ComplexityReport {
    pub fn file(&self, path: &str) -> Option<&FileComplexity> {
        self.files
            .binary_search_by(|file| file.path.as_str().cmp(path))
            .ok()
            .map(|index| &self.files[index])
    }
}

/// Maintainability index, clamped into [0, 100]; 100 without volume or code
pub fn maintainability_index(halstead_volume: f64, complexity: usize, sloc: usize) -> f64 {
    if halstead_volume <= 0.0 || sloc == 0 {
        return 100.0;
    }
    let index = 171.0
        - 5.2 * halstead_volume.ln()
        - 0.23 * complexity as f64
        - 16.2 * (sloc as f64).ln();
    index.clamp(0.0, 100.0)
}

/// Repository complexity score over a set of per-file results
pub fn complexity_score<'a>(files: impl IntoIterator<Item = &'a FileComplexity>) -> f64 {
    let (total, count) = files
        .into_iter()
        .fold((0usize, 0usize), |(total, count), file| (total + file.function_complexity, count + 1));
    let avg = if count == 0 { 0.0 } else { total as f64 / count as f64 };
    ComplexityThresholds::complexity_score(avg)
}

#[derive(Debug, Default)]
struct ComplexityAccumulator {
    total_functions: usize,
    total_complexity: usize,
    max_complexity: usize,
    rank_distribution: BTreeMap<ComplexityRank, usize>,
    high_complexity: Vec<FunctionComplexity>,
    raw_totals: RawMetrics,
    files: Vec<FileComplexity>,
}

impl ComplexityAccumulator {
    fn from_file(file: &SourceFile, symbols: &SymbolTable) -> Self {
        let mut acc = Self::default();
        let mut function_complexity = 0;

        for function in &symbols.functions {
            let complexity = function.cyclomatic_complexity();
            let rank = ComplexityRank::from_complexity(complexity);
            function_complexity += complexity;
            acc.max_complexity = acc.max_complexity.max(complexity);
            *acc.rank_distribution.entry(rank).or_insert(0) += 1;
            if complexity > ComplexityThresholds::FUNCTION_WARNING_COMPLEXITY {
                acc.high_complexity.push(FunctionComplexity {
                    file: file.path.clone(),
                    name: function.name.clone(),
                    class_name: function.class_name.clone(),
                    line: function.line,
                    complexity,
                    rank,
                });
            }
        }

        let total = symbols.total_complexity();
        let volume = symbols.halstead.volume();
        let index = maintainability_index(volume, total, symbols.raw.sloc);

        acc.total_functions = symbols.functions.len();
        acc.total_complexity = function_complexity;
        acc.raw_totals = symbols.raw;
        acc.files.push(FileComplexity {
            path: file.path.clone(),
            complexity: total,
            function_complexity,
            function_count: symbols.functions.len(),
            maintainability_index: index,
            maintainability_rank: MaintainabilityRank::from_index(index),
            halstead_volume: volume,
            raw: symbols.raw,
        });
        acc
    }

    fn merge(mut self, other: Self) -> Self {
        self.total_functions += other.total_functions;
        self.total_complexity += other.total_complexity;
        self.max_complexity = self.max_complexity.max(other.max_complexity);
        for (rank, count) in other.rank_distribution {
            *self.rank_distribution.entry(rank).or_insert(0) += count;
        }
        self.high_complexity.extend(other.high_complexity);
        self.raw_totals.loc += other.raw_totals.loc;
        self.raw_totals.sloc += other.raw_totals.sloc;
        self.raw_totals.comments += other.raw_totals.comments;
        self.raw_totals.blank += other.raw_totals.blank;
        self.files.extend(other.files);
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityAnalyzer;

impl Analyzer for ComplexityAnalyzer {
    type Report = ComplexityReport;

    fn name(&self) -> &'static str {
        "complexity"
    }

    fn analyze(&self, snapshot: &SourceSnapshot) -> Result<ComplexityReport> {
        let mut acc = snapshot
            .files
            .par_iter()
            .filter_map(|file| file.parsed().map(|symbols| ComplexityAccumulator::from_file(file, symbols)))
            .reduce(ComplexityAccumulator::default, ComplexityAccumulator::merge);

        acc.files.sort_by(|a, b| a.path.cmp(&b.path));
        acc.high_complexity.sort_by(|a, b| {
            b.complexity
                .cmp(&a.complexity)
                .then_with(|| a.file.cmp(&b.file))
                .then_with(|| a.line.cmp(&b.line))
        });

        let files_analyzed = acc.files.len();
        let avg_complexity = if files_analyzed == 0 {
            0.0
        } else {
            acc.total_complexity as f64 / files_analyzed as f64
        };
        let avg_maintainability_index = if files_analyzed == 0 {
            100.0
        } else {
            acc.files.iter().map(|f| f.maintainability_index).sum::<f64>() / files_analyzed as f64
        };

        info!(
            files = files_analyzed,
            functions = acc.total_functions,
            avg_complexity,
            "complexity analysis complete"
        );

        Ok(ComplexityReport {
            files_analyzed,
            total_functions: acc.total_functions,
            total_complexity: acc.total_complexity,
            avg_complexity,
            max_complexity: acc.max_complexity,
            complexity_score: ComplexityThresholds::complexity_score(avg_complexity),
            avg_maintainability_index,
            rank_distribution: acc.rank_distribution,
            high_complexity_functions: acc.high_complexity,
            raw_totals: acc.raw_totals,
            files: acc.files,
        })
    }
}
