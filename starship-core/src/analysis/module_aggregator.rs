//! Module Aggregator
//!
//! Folds the per-file analyzer results into one [`Module`] per structural
//! partition and places the modules in space.

use super::health_calculator::HealthCalculator;
use super::layout::layout;
use crate::extractors::complexity::{complexity_score, ComplexityReport};
use crate::extractors::documentation::{DocumentationReport, DocumentationTotals};
use crate::extractors::structure::{ModulePartition, StructureReport};
use crate::extractors::yagni::{yagni_score, YagniReport};
use crate::models::{HealthStatus, Module};
use crate::LayoutOptions;
use std::collections::HashSet;
use tracing::debug;

/// Analyzer reports a module aggregate is computed from
#[derive(Debug, Clone, Copy)]
pub struct ModuleInputs<'a> {
    pub structure: &'a StructureReport,
    pub complexity: &'a ComplexityReport,
    pub documentation: &'a DocumentationReport,
    pub yagni: &'a YagniReport,
}

#[derive(Debug, Clone, Default)]
pub struct ModuleAggregator {
    health: HealthCalculator,
    layout: LayoutOptions,
}

impl ModuleAggregator {
    pub fn new(layout: LayoutOptions) -> Self {
        Self { health: HealthCalculator::new(), layout }
    }

    pub fn aggregate(&self, inputs: ModuleInputs<'_>) -> Vec<Module> {
        let mut modules: Vec<Module> = inputs
            .structure
            .modules
            .iter()
            .map(|partition| self.module(partition, &inputs))
            .collect();

        let sizes: Vec<usize> = modules.iter().map(|module| module.size).collect();
        for (module, position) in modules.iter_mut().zip(layout(&sizes, &self.layout)) {
            module.x = position.x;
            module.y = position.y;
            module.z = position.z;
        }
        modules
    }

    fn module(&self, partition: &ModulePartition, inputs: &ModuleInputs<'_>) -> Module {
        let complexity_files: Vec<_> = partition
            .files
            .iter()
            .filter_map(|path| inputs.complexity.file(path))
            .collect();
        let maintainability: Vec<f64> = complexity_files
            .iter()
            .map(|file| file.maintainability_index)
            .collect();

        let documentation = DocumentationTotals::from_files(
            partition.files.iter().filter_map(|path| inputs.documentation.file(path)),
        )
        .overall_score();

        let members: HashSet<&str> = partition.files.iter().map(String::as_str).collect();
        let yagni = yagni_score(
            inputs
                .yagni
                .issues
                .iter()
                .filter(|issue| members.contains(issue.file.as_str())),
        );

        let health = self.health.module_health(&maintainability);
        debug!(module = %partition.id, health, files = partition.files.len(), "module aggregated");

        Module {
            id: partition.id.clone(),
            name: partition.name.clone(),
            path: partition.path.clone(),
            files: partition.files.clone(),
            size: partition.size,
            complexity: complexity_score(complexity_files.iter().copied()),
            documentation,
            yagni,
            health,
            status: HealthStatus::from_health(health),
            module_type: partition.module_type,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{
        Analyzer, ComplexityAnalyzer, DocumentationAnalyzer, StructureAnalyzer, YagniDetector,
    };
    use crate::models::{FunctionSymbol, HalsteadCounts, RawMetrics, SourceFile, SourceSnapshot, SymbolTable};
    use crate::parsers::SourceLanguage;
    use crate::Result;
    use std::path::PathBuf;

    fn file(path: &str, symbols: SymbolTable) -> SourceFile {
        SourceFile {
            path: path.to_string(),
            language: SourceLanguage::Python,
            line_count: symbols.raw.loc,
            symbols: Some(symbols),
            error: None,
        }
    }

    fn aggregate(snapshot: &SourceSnapshot) -> Result<Vec<Module>> {
        let structure = StructureAnalyzer::default().analyze(snapshot)?;
        let complexity = ComplexityAnalyzer.analyze(snapshot)?;
        let documentation = DocumentationAnalyzer.analyze(snapshot)?;
        let yagni = YagniDetector::default().analyze(snapshot)?;
        Ok(ModuleAggregator::default().aggregate(ModuleInputs {
            structure: &structure,
            complexity: &complexity,
            documentation: &documentation,
            yagni: &yagni,
        }))
    }

    #[test]
    fn test_scores_are_scoped_to_module_files() -> Result<()> {
        let documented = SymbolTable {
            module_docstring: Some("Helpers.".to_string()),
            raw: RawMetrics { loc: 10, sloc: 8, comments: 0, blank: 2 },
            ..Default::default()
        };
        let heavy = SymbolTable {
            functions: vec![FunctionSymbol {
                name: "tangled".to_string(),
                line: 1,
                branch_points: 40,
                ..Default::default()
            }],
            raw: RawMetrics { loc: 5000, sloc: 5000, comments: 0, blank: 0 },
            halstead: HalsteadCounts {
                distinct_operators: 200,
                distinct_operands: 2000,
                total_operators: 500_000,
                total_operands: 500_000,
            },
            ..Default::default()
        };
        let snapshot = SourceSnapshot {
            root: PathBuf::from("/r"),
            root_name: "r".to_string(),
            files: vec![file("core/engine.py", heavy), file("utils/help.py", documented)],
        };

        let modules = aggregate(&snapshot)?;
        assert_eq!(modules.len(), 2);

        let core = &modules[0];
        assert_eq!(core.id, "core");
        assert_eq!(core.health, 0.0);
        assert_eq!(core.status, HealthStatus::Critical);
        assert_eq!(core.documentation, 0.0);

        let utils = &modules[1];
        assert_eq!(utils.health, 1.0);
        assert_eq!(utils.complexity, 100.0);
        assert!((utils.documentation - 20.0).abs() < 1e-9);
        assert_eq!(utils.size, 10);
        Ok(())
    }

    #[test]
    fn test_aggregation_is_repeatable() -> Result<()> {
        let snapshot = SourceSnapshot {
            root: PathBuf::from("/r"),
            root_name: "r".to_string(),
            files: vec![
                file("a.py", SymbolTable::default()),
                file("pkg/b.py", SymbolTable::default()),
            ],
        };
        assert_eq!(aggregate(&snapshot)?, aggregate(&snapshot)?);
        Ok(())
    }
}
