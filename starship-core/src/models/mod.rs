//! Data models for Starship core
//!
//! The normalized per-file symbol table, the source snapshot shared by the
//! analyzers, module aggregates and the final analysis result.

pub mod analysis_result;
pub mod module;
pub mod source_file;
pub mod symbols;

pub use analysis_result::{AnalysisDetails, AnalysisResult, RepositoryMetrics, VulnerabilityCounts};
pub use module::{HealthStatus, Module, ModuleType};
pub use source_file::{FileError, FileErrorKind, SourceFile, SourceSnapshot};
pub use symbols::{
    Assignment, ClassSymbol, FunctionSymbol, HalsteadCounts, ImportStatement, RawMetrics,
    SymbolKind, SymbolTable,
};
