//! Health Score and Quality Thresholds
//!
//! Boundaries between health levels plus the fixed weights of the
//! documentation, yagni and technical-debt formulas.

use serde::{Deserialize, Serialize};

/// Thresholds for module and repository health (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthScoreThresholds;

impl HealthScoreThresholds {
    pub const CRITICAL_BELOW: f64 = 0.3;
    pub const WARNING_BELOW: f64 = 0.6;
    pub const HEALTHY_BELOW: f64 = 0.85;

    /// Maintainability index that maps to zero health
    pub const MI_FLOOR: f64 = 50.0;
    /// Span of maintainability index between zero and full health
    pub const MI_SPAN: f64 = 50.0;

    /// Health used when a module carries no maintainability data
    pub const NO_DATA_HEALTH: f64 = 1.0;

    /// `clamp((mi - 50) / 50, 0, 1)`
    pub fn health_from_maintainability(avg_mi: f64) -> f64 {
        ((avg_mi - Self::MI_FLOOR) / Self::MI_SPAN).clamp(0.0, 1.0)
    }

    /// Whether a health value needs immediate attention
    pub fn requires_attention(health: f64) -> bool {
        health < Self::WARNING_BELOW
    }
}

/// Weights and cut-offs of the documentation scorer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentationThresholds;

impl DocumentationThresholds {
    pub const BASE_POINTS: u32 = 25;
    pub const LENGTH_POINTS: u32 = 25;
    pub const PARAMETER_POINTS: u32 = 20;
    pub const RETURN_POINTS: u32 = 20;
    pub const EXCEPTION_POINTS: u32 = 10;
    /// Word count a docstring must exceed to earn the length points
    pub const MIN_WORDS: usize = 10;

    pub const GOOD_QUALITY: u32 = 70;
    pub const ADEQUATE_QUALITY: u32 = 40;

    pub const FUNCTION_WEIGHT: f64 = 0.4;
    pub const CLASS_WEIGHT: f64 = 0.3;
    pub const MODULE_WEIGHT: f64 = 0.2;
    pub const COMMENT_DENSITY_FACTOR: f64 = 5.0;
    pub const COMMENT_BONUS_CAP: f64 = 10.0;

    pub const PARAMETER_KEYWORDS: &'static [&'static str] = &["param", "args"];
    pub const RETURN_KEYWORDS: &'static [&'static str] = &["return"];
    pub const EXCEPTION_KEYWORDS: &'static [&'static str] = &["raise", "except"];
}

/// Severity weights of the yagni score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityWeights;

impl SeverityWeights {
    pub const LOW: u32 = 1;
    pub const MEDIUM: u32 = 2;
    pub const HIGH: u32 = 3;
    /// Points removed from 100 per unit of weight
    pub const PENALTY_PER_WEIGHT: f64 = 2.0;

    /// Technical debt blend of the four sub-scores
    pub const DEBT_COMPLEXITY_WEIGHT: f64 = 0.3;
    pub const DEBT_DOCUMENTATION_WEIGHT: f64 = 0.3;
    pub const DEBT_YAGNI_WEIGHT: f64 = 0.2;
    pub const DEBT_COUPLING_WEIGHT: f64 = 0.2;

    /// `max(0, 100 - 2 * total_weight)`
    pub fn yagni_score(total_weight: u32) -> f64 {
        (100.0 - Self::PENALTY_PER_WEIGHT * f64::from(total_weight)).max(0.0)
    }

    /// Inverse blend of the quality scores, clamped into [0, 100]
    pub fn tech_debt(complexity: f64, documentation: f64, yagni: f64, coupling: f64) -> f64 {
        let quality = Self::DEBT_COMPLEXITY_WEIGHT * complexity
            + Self::DEBT_DOCUMENTATION_WEIGHT * documentation
            + Self::DEBT_YAGNI_WEIGHT * yagni
            + Self::DEBT_COUPLING_WEIGHT * coupling;
        (100.0 - quality).clamp(0.0, 100.0)
    }
}
