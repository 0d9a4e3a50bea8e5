//! Dead-Code / YAGNI Detector
//!
//! Usage counting is done per file and merged repository-wide before any
//! symbol is judged unused. Over-engineering patterns are matched through
//! the configured [`HeuristicPolicy`] and feed the yagni score; the
//! dead-code list never does.

use super::Analyzer;
use crate::constants::heuristic_policy::last_segment;
use crate::constants::{HeuristicPolicy, SeverityWeights};
use crate::models::{ClassSymbol, SourceFile, SourceSnapshot, SymbolKind, SymbolTable};
use crate::{AnalysisConfig, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn weight(self) -> u32 {
        match self {
            Self::Low => SeverityWeights::LOW,
            Self::Medium => SeverityWeights::MEDIUM,
            Self::High => SeverityWeights::HIGH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YagniPattern {
    SingleImplementationInterface,
    UnnecessaryWrapper,
    PrematureCaching,
    ComplexDataStructure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YagniIssue {
    pub file: String,
    pub line: usize,
    /// Class, function or container involved
    pub name: String,
    pub pattern: YagniPattern,
    pub severity: Severity,
    pub message: String,
}

/// A defined symbol with no recorded use
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnusedSymbol {
    /// `path:name`
    pub identifier: String,
    pub file: String,
    pub name: String,
    pub kind: SymbolKind,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YagniSummary {
    pub unused_functions: usize,
    pub unused_classes: usize,
    pub single_implementations: usize,
    pub unnecessary_wrappers: usize,
    pub premature_caching: usize,
    pub complex_data_structures: usize,
    pub total_issues: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YagniReport {
    /// `max(0, 100 - 2 * total severity weight)`
    pub yagni_score: f64,
    pub issues: Vec<YagniIssue>,
    pub dead_code: Vec<UnusedSymbol>,
    pub defined_variables: usize,
    pub summary: YagniSummary,
}

/// yagni score of a set of issues
pub fn yagni_score<'a>(issues: impl IntoIterator<Item = &'a YagniIssue>) -> f64 {
    SeverityWeights::yagni_score(issues.into_iter().map(|issue| issue.severity.weight()).sum())
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Definition {
    file: String,
    name: String,
    line: usize,
}

/// Abstract class waiting for the repository-wide subclass count
#[derive(Debug, Clone)]
struct InterfaceCandidate {
    file: String,
    name: String,
    line: usize,
}

#[derive(Debug, Default)]
struct UsageAccumulator {
    functions: BTreeSet<Definition>,
    classes: BTreeSet<Definition>,
    variables: BTreeSet<(String, String)>,
    calls: HashMap<String, usize>,
    references: HashMap<String, usize>,
    subclass_counts: HashMap<String, usize>,
    candidates: Vec<InterfaceCandidate>,
    issues: Vec<YagniIssue>,
}

impl UsageAccumulator {
    fn from_file(file: &SourceFile, symbols: &SymbolTable, policy: &HeuristicPolicy) -> Self {
        let mut acc = Self::default();
        let path = &file.path;

        // Pass 1: definitions
        for function in &symbols.functions {
            acc.functions.insert(Definition {
                file: path.clone(),
                name: function.name.clone(),
                line: function.line,
            });
        }
        for class in &symbols.classes {
            acc.classes.insert(Definition {
                file: path.clone(),
                name: class.name.clone(),
                line: class.line,
            });
        }
        for assignment in &symbols.assignments {
            for target in &assignment.targets {
                acc.variables.insert((path.clone(), target.clone()));
            }
        }

        // Pass 2: usage
        for callee in &symbols.calls {
            *acc.calls.entry(callee.clone()).or_insert(0) += 1;
        }
        for name in &symbols.references {
            *acc.references.entry(name.clone()).or_insert(0) += 1;
        }
        for class in &symbols.classes {
            for base in &class.bases {
                *acc.subclass_counts.entry(last_segment(base).to_string()).or_insert(0) += 1;
            }
        }

        for class in &symbols.classes {
            if is_interface_candidate(class, policy) {
                acc.candidates.push(InterfaceCandidate {
                    file: path.clone(),
                    name: class.name.clone(),
                    line: class.line,
                });
            }
            if let Some(issue) = wrapper_issue(path, class, policy) {
                acc.issues.push(issue);
            }
        }
        acc.issues.extend(premature_caching_issues(path, symbols, policy));
        acc.issues.extend(container_issues(path, symbols, policy));
        acc
    }

    fn merge(mut self, other: Self) -> Self {
        self.functions.extend(other.functions);
        self.classes.extend(other.classes);
        self.variables.extend(other.variables);
        for (name, count) in other.calls {
            *self.calls.entry(name).or_insert(0) += count;
        }
        for (name, count) in other.references {
            *self.references.entry(name).or_insert(0) += count;
        }
        for (name, count) in other.subclass_counts {
            *self.subclass_counts.entry(name).or_insert(0) += count;
        }
        self.candidates.extend(other.candidates);
        self.issues.extend(other.issues);
        self
    }
}

fn is_interface_candidate(class: &ClassSymbol, policy: &HeuristicPolicy) -> bool {
    class.bases.iter().any(|base| policy.is_abstract_base(base))
        && class.methods.iter().any(|method| {
            method
                .decorators
                .iter()
                .any(|decorator| policy.is_abstract_decorator(decorator))
        })
}

fn wrapper_issue(path: &str, class: &ClassSymbol, policy: &HeuristicPolicy) -> Option<YagniIssue> {
    let public: Vec<_> = class.methods.iter().filter(|method| !method.is_dunder()).collect();
    if public.is_empty() {
        return None;
    }
    let delegating = public.iter().filter(|method| method.delegates_to_attribute).count();
    let ratio = delegating as f64 / public.len() as f64;
    (ratio > policy.wrapper_delegation_ratio).then(|| YagniIssue {
        file: path.to_string(),
        line: class.line,
        name: class.name.clone(),
        pattern: YagniPattern::UnnecessaryWrapper,
        severity: Severity::Low,
        message: format!(
            "Class '{}' appears to be mostly delegating calls, consider if this abstraction is necessary",
            class.name
        ),
    })
}

fn premature_caching_issues(path: &str, symbols: &SymbolTable, policy: &HeuristicPolicy) -> Vec<YagniIssue> {
    symbols
        .functions
        .iter()
        .filter(|function| function.statement_count < policy.premature_cache_max_statements)
        .filter(|function| {
            function
                .decorators
                .iter()
                .any(|decorator| policy.is_cache_decorator(decorator))
        })
        .map(|function| YagniIssue {
            file: path.to_string(),
            line: function.line,
            name: function.name.clone(),
            pattern: YagniPattern::PrematureCaching,
            severity: Severity::Low,
            message: format!(
                "Function '{}' uses caching but appears simple - might be premature optimization",
                function.name
            ),
        })
        .collect()
}

fn container_issues(path: &str, symbols: &SymbolTable, policy: &HeuristicPolicy) -> Vec<YagniIssue> {
    symbols
        .assignments
        .iter()
        .filter_map(|assignment| {
            let callee = assignment.value_callee.as_deref()?;
            policy.is_heavyweight_container(callee).then(|| YagniIssue {
                file: path.to_string(),
                line: assignment.line,
                name: last_segment(callee).to_string(),
                pattern: YagniPattern::ComplexDataStructure,
                severity: Severity::Low,
                message: format!("Using {} - ensure this complexity is needed", last_segment(callee)),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct YagniDetector {
    policy: HeuristicPolicy,
}

impl YagniDetector {
    pub fn new(policy: HeuristicPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.heuristics.clone())
    }
}

impl Analyzer for YagniDetector {
    type Report = YagniReport;

    fn name(&self) -> &'static str {
        "yagni"
    }

    fn analyze(&self, snapshot: &SourceSnapshot) -> Result<YagniReport> {
        let acc = snapshot
            .files
            .par_iter()
            .filter_map(|file| {
                file.parsed()
                    .map(|symbols| UsageAccumulator::from_file(file, symbols, &self.policy))
            })
            .reduce(UsageAccumulator::default, UsageAccumulator::merge);

        let mut issues = acc.issues;
        for candidate in acc.candidates {
            let implementations = acc.subclass_counts.get(&candidate.name).copied().unwrap_or(0);
            if implementations <= self.policy.max_implementations {
                issues.push(YagniIssue {
                    message: format!(
                        "Abstract class '{}' might be over-engineering if it has only one implementation",
                        candidate.name
                    ),
                    file: candidate.file,
                    line: candidate.line,
                    name: candidate.name,
                    pattern: YagniPattern::SingleImplementationInterface,
                    severity: Severity::Medium,
                });
            }
        }
        issues.sort_by(|a, b| a.file.cmp(&b.file).then(a.line.cmp(&b.line)).then(a.name.cmp(&b.name)));

        let mut dead_code: BTreeSet<UnusedSymbol> = BTreeSet::new();
        let mut reported: BTreeSet<(String, String)> = BTreeSet::new();
        for function in &acc.functions {
            let called = acc.calls.get(&function.name).copied().unwrap_or(0) > 0;
            if !called
                && !self.policy.is_always_used(&function.name)
                && reported.insert((function.file.clone(), function.name.clone()))
            {
                dead_code.insert(unused(function, SymbolKind::Function));
            }
        }
        for class in &acc.classes {
            let referenced = acc.references.get(&class.name).copied().unwrap_or(0) > 0;
            if !referenced && reported.insert((class.file.clone(), class.name.clone())) {
                dead_code.insert(unused(class, SymbolKind::Class));
            }
        }
        let dead_code: Vec<UnusedSymbol> = dead_code.into_iter().collect();

        let count = |pattern: YagniPattern| issues.iter().filter(|issue| issue.pattern == pattern).count();
        let summary = YagniSummary {
            unused_functions: dead_code.iter().filter(|d| d.kind == SymbolKind::Function).count(),
            unused_classes: dead_code.iter().filter(|d| d.kind == SymbolKind::Class).count(),
            single_implementations: count(YagniPattern::SingleImplementationInterface),
            unnecessary_wrappers: count(YagniPattern::UnnecessaryWrapper),
            premature_caching: count(YagniPattern::PrematureCaching),
            complex_data_structures: count(YagniPattern::ComplexDataStructure),
            total_issues: issues.len(),
        };

        let report = YagniReport {
            yagni_score: yagni_score(&issues),
            issues,
            dead_code,
            defined_variables: acc.variables.len(),
            summary,
        };
        info!(
            score = report.yagni_score,
            issues = report.summary.total_issues,
            dead_code = report.dead_code.len(),
            "yagni detection complete"
        );
        Ok(report)
    }
}

fn unused(definition: &Definition, kind: SymbolKind) -> UnusedSymbol {
    UnusedSymbol {
        identifier: format!("{}:{}", definition.file, definition.name),
        file: definition.file.clone(),
        name: definition.name.clone(),
        kind,
        line: definition.line,
    }
}
