use proptest::prelude::*;
use starship_core::analysis::layout::{layout, radius};
use starship_core::analysis::HealthCalculator;
use starship_core::extractors::complexity::maintainability_index;
use starship_core::extractors::{Analyzer, ComplexityAnalyzer, DocumentationAnalyzer};
use starship_core::models::{FunctionSymbol, SourceFile, SourceSnapshot, SymbolTable};
use starship_core::{LayoutOptions, SourceLanguage};
use std::path::PathBuf;

fn snapshot(functions: Vec<FunctionSymbol>) -> SourceSnapshot {
    SourceSnapshot {
        root: PathBuf::from("/repo"),
        root_name: "repo".to_string(),
        files: vec![SourceFile {
            path: "m.py".to_string(),
            language: SourceLanguage::Python,
            line_count: 1,
            symbols: Some(SymbolTable { functions, ..Default::default() }),
            error: None,
        }],
    }
}

fn functions() -> impl Strategy<Value = Vec<FunctionSymbol>> {
    prop::collection::vec((0usize..30, any::<bool>()), 0..20).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (branch_points, documented))| FunctionSymbol {
                name: format!("f{i}"),
                line: i + 1,
                branch_points,
                docstring: documented.then(|| "Does a thing.".to_string()),
                ..Default::default()
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn coverage_percentages_stay_in_bounds(functions in functions()) {
        let report = DocumentationAnalyzer.analyze(&snapshot(functions.clone()))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!((0.0..=100.0).contains(&report.function_coverage));
        prop_assert!((0.0..=100.0).contains(&report.overall_score));
        if functions.is_empty() {
            prop_assert_eq!(report.function_coverage, 0.0);
        }
    }

    #[test]
    fn extra_decision_point_adds_exactly_one(functions in functions(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!functions.is_empty());
        let index = pick.index(functions.len());
        let mut bumped = functions.clone();
        bumped[index].branch_points += 1;

        let before = ComplexityAnalyzer.analyze(&snapshot(functions))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let after = ComplexityAnalyzer.analyze(&snapshot(bumped))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(after.total_complexity, before.total_complexity + 1);
        prop_assert!(after.complexity_score <= before.complexity_score);
    }

    #[test]
    fn maintainability_and_health_are_clamped(
        volume in 0.0f64..1e12,
        complexity in 0usize..100_000,
        sloc in 0usize..10_000_000,
    ) {
        let index = maintainability_index(volume, complexity, sloc);
        prop_assert!((0.0..=100.0).contains(&index));
        let health = HealthCalculator::new().module_health(&[index]);
        prop_assert!((0.0..=1.0).contains(&health));
    }

    #[test]
    fn unjittered_layout_stays_on_or_inside_the_sphere(sizes in prop::collection::vec(0usize..10_000, 1..40)) {
        let r = radius(sizes.len());
        for position in layout(&sizes, &LayoutOptions::default()) {
            let distance = (position.x.powi(2) + position.y.powi(2) + position.z.powi(2)).sqrt();
            prop_assert!(distance <= r + 1e-9);
        }
    }
}
