//! Starship Analysis Pipeline
//!
//! Builds one immutable snapshot of the tree, runs every analyzer over it
//! concurrently and assembles the repository metrics, module aggregates and
//! per-file errors into a single [`AnalysisResult`].

pub mod health_calculator;
pub mod layout;
pub mod module_aggregator;

pub use health_calculator::HealthCalculator;
pub use layout::Position;
pub use module_aggregator::{ModuleAggregator, ModuleInputs};

use crate::constants::HealthScoreThresholds;
use crate::extractors::{
    Analyzer, ComplexityAnalyzer, ComplexityReport, DependencyAnalyzer, DependencyReport,
    DocumentationAnalyzer, DocumentationReport, SourceInventory, StructureAnalyzer,
    StructureReport, YagniDetector, YagniReport,
};
use crate::models::{AnalysisDetails, AnalysisResult, RepositoryMetrics, SourceSnapshot};
use crate::parsers::ParserRegistry;
use crate::{AnalysisConfig, Error, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Main analysis orchestrator that coordinates all analyzers
#[derive(Debug, Clone)]
pub struct AnalysisOrchestrator {
    codebase_path: PathBuf,
    config: AnalysisConfig,
    registry: ParserRegistry,
}

impl AnalysisOrchestrator {
    /// Validates `config` and the root before any file is read
    pub fn new(codebase_path: impl AsRef<Path>, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let codebase_path = codebase_path.as_ref().to_path_buf();
        if !codebase_path.is_dir() {
            return Err(Error::Config(format!(
                "codebase path is not an existing directory: {}",
                codebase_path.display()
            )));
        }

        Ok(Self {
            codebase_path,
            config,
            registry: ParserRegistry::with_defaults(),
        })
    }

    /// Replace the parser set, e.g. to add a language
    pub fn with_registry(mut self, registry: ParserRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Inventory and parse the tree on the blocking pool
    pub async fn snapshot(&self) -> Result<Arc<SourceSnapshot>> {
        let inventory =
            SourceInventory::with_registry(&self.codebase_path, &self.config, self.registry.clone())?;
        let snapshot = tokio::task::spawn_blocking(move || inventory.extract())
            .await
            .map_err(|e| Error::Analysis(format!("source inventory did not complete: {e}")))??;
        Ok(Arc::new(snapshot))
    }

    /// Run a single analyzer over a fresh snapshot
    pub async fn run<A>(&self, analyzer: A) -> Result<A::Report>
    where
        A: Analyzer + Send + 'static,
    {
        let snapshot = self.snapshot().await?;
        run_blocking(analyzer, snapshot).await
    }

    /// Run comprehensive analysis using all analyzers
    pub async fn analyze(&self) -> Result<AnalysisResult> {
        let start_time = Instant::now();
        info!(path = %self.codebase_path.display(), "starting analysis");

        let snapshot = self.snapshot().await?;

        let (complexity, dependencies, documentation, yagni, structure) = tokio::try_join!(
            run_blocking(ComplexityAnalyzer, Arc::clone(&snapshot)),
            run_blocking(DependencyAnalyzer::from_config(&self.config), Arc::clone(&snapshot)),
            run_blocking(DocumentationAnalyzer, Arc::clone(&snapshot)),
            run_blocking(YagniDetector::from_config(&self.config), Arc::clone(&snapshot)),
            run_blocking(StructureAnalyzer::from_config(&self.config), Arc::clone(&snapshot)),
        )?;

        let modules = ModuleAggregator::new(self.config.layout).aggregate(ModuleInputs {
            structure: &structure,
            complexity: &complexity,
            documentation: &documentation,
            yagni: &yagni,
        });

        let health = HealthCalculator::new();
        let metrics = RepositoryMetrics {
            complexity: complexity.complexity_score,
            documentation: documentation.overall_score,
            yagni: yagni.yagni_score,
            dependencies: dependencies.total_imports,
            coupling: dependencies.coupling_score,
            tech_debt: health.tech_debt(
                complexity.complexity_score,
                documentation.overall_score,
                yagni.yagni_score,
                dependencies.coupling_score,
            ),
            unique_external_dependencies: dependencies.unique_external_dependencies,
            vulnerabilities: self.config.vulnerabilities,
            circular_dependencies: dependencies.circular_dependencies.len(),
            overall_health: health.repository_health(&modules),
            files_analyzed: snapshot.parsed_count(),
        };

        let details = self.config.include_details.then(|| AnalysisDetails {
            complexity,
            dependencies,
            documentation,
            yagni,
        });

        let result = AnalysisResult {
            codebase_path: self.codebase_path.display().to_string(),
            files_analyzed: snapshot.files.len(),
            analysis_timestamp: Utc::now(),
            analysis_duration: start_time.elapsed().as_secs_f64(),
            metrics,
            modules,
            details,
            errors: snapshot.errors(),
        };

        let attention = result
            .modules
            .iter()
            .filter(|module| HealthScoreThresholds::requires_attention(module.health))
            .count();
        info!(
            files = result.files_analyzed,
            modules = result.modules.len(),
            needs_attention = attention,
            errors = result.errors.len(),
            health = result.metrics.overall_health,
            duration = result.analysis_duration,
            "analysis complete"
        );
        Ok(result)
    }
}

async fn run_blocking<A>(analyzer: A, snapshot: Arc<SourceSnapshot>) -> Result<A::Report>
where
    A: Analyzer + Send + 'static,
{
    let name = analyzer.name();
    debug!(analyzer = name, "running analyzer");
    tokio::task::spawn_blocking(move || analyzer.analyze(&snapshot))
        .await
        .map_err(|e| Error::Analysis(format!("{name} analyzer did not complete: {e}")))?
}

pub async fn analyze_complexity(
    codebase_path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<ComplexityReport> {
    AnalysisOrchestrator::new(codebase_path, config.clone())?
        .run(ComplexityAnalyzer)
        .await
}

pub async fn analyze_dependencies(
    codebase_path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<DependencyReport> {
    AnalysisOrchestrator::new(codebase_path, config.clone())?
        .run(DependencyAnalyzer::from_config(config))
        .await
}

pub async fn analyze_documentation(
    codebase_path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<DocumentationReport> {
    AnalysisOrchestrator::new(codebase_path, config.clone())?
        .run(DocumentationAnalyzer)
        .await
}

pub async fn detect_yagni(
    codebase_path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<YagniReport> {
    AnalysisOrchestrator::new(codebase_path, config.clone())?
        .run(YagniDetector::from_config(config))
        .await
}

pub async fn analyze_structure(
    codebase_path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<StructureReport> {
    AnalysisOrchestrator::new(codebase_path, config.clone())?
        .run(StructureAnalyzer::from_config(config))
        .await
}

/// Combined analysis: a complete result or a single error
pub async fn analyze_repository(
    codebase_path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<AnalysisResult> {
    AnalysisOrchestrator::new(codebase_path, config.clone())?
        .analyze()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_root_is_config_error() {
        let result = analyze_repository("/no/such/starship/root", &AnalysisConfig::default()).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_reading() -> Result<()> {
        let dir = tempdir()?;
        let config = AnalysisConfig { most_imported_limit: 0, ..Default::default() };
        let result = analyze_repository(dir.path(), &config).await;
        assert!(matches!(result, Err(Error::Config(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_tree() -> Result<()> {
        let dir = tempdir()?;
        let result = analyze_repository(dir.path(), &AnalysisConfig::default()).await?;
        assert_eq!(result.files_analyzed, 0);
        assert!(result.modules.is_empty());
        assert_eq!(result.metrics.overall_health, 1.0);
        assert_eq!(result.metrics.complexity, 100.0);
        assert!(result.details.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_details_can_be_omitted() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join("app.py"), "def main():\n    return 0\n")?;
        let config = AnalysisConfig { include_details: false, ..Default::default() };
        let result = analyze_repository(dir.path(), &config).await?;
        assert!(result.details.is_none());
        assert_eq!(result.modules.len(), 1);
        assert_eq!(result.modules[0].id, ".");
        Ok(())
    }
}
