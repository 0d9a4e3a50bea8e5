//! Complexity Analysis Thresholds
//!
//! Rank buckets for cyclomatic complexity and the maintainability index.

use serde::{Deserialize, Serialize};

/// Cyclomatic complexity thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityThresholds;

impl ComplexityThresholds {
    pub const LOW_COMPLEXITY: usize = 5;
    pub const MODERATE_COMPLEXITY: usize = 10;
    pub const HIGH_COMPLEXITY: usize = 20;
    pub const VERY_HIGH_COMPLEXITY: usize = 30;

    /// Functions above this are listed as high-complexity
    pub const FUNCTION_WARNING_COMPLEXITY: usize = 10;

    /// Penalty per unit of average complexity in the repository score
    pub const SCORE_PENALTY_PER_POINT: f64 = 5.0;

    /// Maintainability index rank boundaries
    pub const MI_RANK_A_ABOVE: f64 = 19.0;
    pub const MI_RANK_B_FROM: f64 = 10.0;

    /// Repository complexity score: `clamp(100 - avg * 5, 0, 100)`
    pub fn complexity_score(avg_complexity: f64) -> f64 {
        (100.0 - avg_complexity * Self::SCORE_PENALTY_PER_POINT).clamp(0.0, 100.0)
    }
}

/// Rank bucket of a cyclomatic complexity value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplexityRank {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl ComplexityRank {
    pub fn from_complexity(complexity: usize) -> Self {
        match complexity {
            c if c <= ComplexityThresholds::LOW_COMPLEXITY => Self::Low,
            c if c <= ComplexityThresholds::MODERATE_COMPLEXITY => Self::Moderate,
            c if c <= ComplexityThresholds::HIGH_COMPLEXITY => Self::High,
            c if c <= ComplexityThresholds::VERY_HIGH_COMPLEXITY => Self::VeryHigh,
            _ => Self::Extreme,
        }
    }
}

impl std::fmt::Display for ComplexityRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Moderate => write!(f, "moderate"),
            Self::High => write!(f, "high"),
            Self::VeryHigh => write!(f, "very-high"),
            Self::Extreme => write!(f, "extreme"),
        }
    }
}

/// Maintainability index letter rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaintainabilityRank {
    A,
    B,
    C,
}

impl MaintainabilityRank {
    pub fn from_index(index: f64) -> Self {
        if index > ComplexityThresholds::MI_RANK_A_ABOVE {
            Self::A
        } else if index >= ComplexityThresholds::MI_RANK_B_FROM {
            Self::B
        } else {
            Self::C
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_buckets() {
        assert_eq!(ComplexityRank::from_complexity(1), ComplexityRank::Low);
        assert_eq!(ComplexityRank::from_complexity(5), ComplexityRank::Low);
        assert_eq!(ComplexityRank::from_complexity(6), ComplexityRank::Moderate);
        assert_eq!(ComplexityRank::from_complexity(10), ComplexityRank::Moderate);
        assert_eq!(ComplexityRank::from_complexity(11), ComplexityRank::High);
        assert_eq!(ComplexityRank::from_complexity(20), ComplexityRank::High);
        assert_eq!(ComplexityRank::from_complexity(21), ComplexityRank::VeryHigh);
        assert_eq!(ComplexityRank::from_complexity(30), ComplexityRank::VeryHigh);
        assert_eq!(ComplexityRank::from_complexity(31), ComplexityRank::Extreme);
        assert_eq!(ComplexityRank::VeryHigh.to_string(), "very-high");
    }

    #[test]
    fn test_mi_rank() {
        assert_eq!(MaintainabilityRank::from_index(100.0), MaintainabilityRank::A);
        assert_eq!(MaintainabilityRank::from_index(19.0), MaintainabilityRank::B);
        assert_eq!(MaintainabilityRank::from_index(10.0), MaintainabilityRank::B);
        assert_eq!(MaintainabilityRank::from_index(9.5), MaintainabilityRank::C);
    }

    #[test]
    fn test_complexity_score_clamps() {
        assert_eq!(ComplexityThresholds::complexity_score(0.0), 100.0);
        assert_eq!(ComplexityThresholds::complexity_score(4.0), 80.0);
        assert_eq!(ComplexityThresholds::complexity_score(50.0), 0.0);
    }
}
