//! Normalized symbol table
//!
//! Every language parser reduces a source file to this shape; the analyzers
//! never look at syntax trees directly.

use serde::{Deserialize, Serialize};

/// Kind of a documented or tracked entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
    Module,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Function => write!(f, "function"),
            Self::Class => write!(f, "class"),
            Self::Module => write!(f, "module"),
        }
    }
}

/// A function or method definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionSymbol {
    pub name: String,
    /// 1-based line of the definition keyword
    pub line: usize,
    pub docstring: Option<String>,
    /// Decorator expressions without call arguments, e.g. `functools.lru_cache`
    pub decorators: Vec<String>,
    /// Decision points in the function's own body (nested definitions excluded)
    pub branch_points: usize,
    /// Number of top-level statements in the body, docstring included
    pub statement_count: usize,
    /// Body is a single `return obj.attr(...)`
    pub delegates_to_attribute: bool,
    /// Enclosing class for methods
    pub class_name: Option<String>,
}

impl FunctionSymbol {
    /// McCabe cyclomatic complexity
    pub fn cyclomatic_complexity(&self) -> usize {
        1 + self.branch_points
    }

    pub fn is_dunder(&self) -> bool {
        self.name.starts_with("__")
    }
}

/// A class definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassSymbol {
    pub name: String,
    pub line: usize,
    pub docstring: Option<String>,
    /// Base class expressions (plus any `metaclass=` value)
    pub bases: Vec<String>,
    /// Methods defined directly in the class body
    pub methods: Vec<FunctionSymbol>,
}

/// One imported module reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStatement {
    /// Dotted module path as written; relative imports keep their leading dots
    pub module: String,
    /// Names pulled in by a from-import (empty for plain imports, `*` for wildcards)
    pub names: Vec<String>,
    pub alias: Option<String>,
    pub is_from_import: bool,
    pub line: usize,
}

impl ImportStatement {
    pub fn is_relative(&self) -> bool {
        self.module.starts_with('.')
    }

    /// First dotted segment, the package id for external imports
    pub fn root_segment(&self) -> &str {
        self.module
            .trim_start_matches('.')
            .split('.')
            .next()
            .unwrap_or_default()
    }
}

/// A simple-name assignment, used for variable definitions and container heuristics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub targets: Vec<String>,
    /// Callee name when the assigned value is a direct call such as `deque()`
    pub value_callee: Option<String>,
    pub line: usize,
}

/// Raw line counts of a file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMetrics {
    pub loc: usize,
    pub sloc: usize,
    pub comments: usize,
    pub blank: usize,
}

/// Halstead operator/operand tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalsteadCounts {
    pub distinct_operators: usize,
    pub distinct_operands: usize,
    pub total_operators: usize,
    pub total_operands: usize,
}

impl HalsteadCounts {
    /// Program volume `N * log2(n)`
    pub fn volume(&self) -> f64 {
        let vocabulary = self.distinct_operators + self.distinct_operands;
        let length = self.total_operators + self.total_operands;
        if vocabulary == 0 {
            return 0.0;
        }
        length as f64 * (vocabulary as f64).log2()
    }
}

/// Parser output for one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolTable {
    pub module_docstring: Option<String>,
    /// Every function in source order, methods and nested functions included
    pub functions: Vec<FunctionSymbol>,
    pub classes: Vec<ClassSymbol>,
    pub imports: Vec<ImportStatement>,
    /// Callee names of every call site
    pub calls: Vec<String>,
    /// Bare identifiers read anywhere in the file
    pub references: Vec<String>,
    pub assignments: Vec<Assignment>,
    pub raw: RawMetrics,
    pub halstead: HalsteadCounts,
    /// Decision points outside any function body
    pub module_branch_points: usize,
}

impl SymbolTable {
    /// File-level cyclomatic complexity: module code plus every function
    pub fn total_complexity(&self) -> usize {
        self.module_branch_points
            + self
                .functions
                .iter()
                .map(FunctionSymbol::cyclomatic_complexity)
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_is_one_plus_branches() {
        let function = FunctionSymbol { name: "f".into(), branch_points: 3, ..Default::default() };
        assert_eq!(function.cyclomatic_complexity(), 4);
    }

    #[test]
    fn test_halstead_volume() {
        let counts = HalsteadCounts {
            distinct_operators: 2,
            distinct_operands: 2,
            total_operators: 3,
            total_operands: 5,
        };
        assert!((counts.volume() - 16.0).abs() < 1e-9);
        assert_eq!(HalsteadCounts::default().volume(), 0.0);
    }

    #[test]
    fn test_import_root_segment() {
        let import = ImportStatement {
            module: "..pkg.sub".into(),
            names: vec!["x".into()],
            alias: None,
            is_from_import: true,
            line: 1,
        };
        assert!(import.is_relative());
        assert_eq!(import.root_segment(), "pkg");
    }

    #[test]
    fn test_total_complexity() {
        let table = SymbolTable {
            module_branch_points: 2,
            functions: vec![
                FunctionSymbol { branch_points: 1, ..Default::default() },
                FunctionSymbol::default(),
            ],
            ..Default::default()
        };
        assert_eq!(table.total_complexity(), 5);
    }
}
