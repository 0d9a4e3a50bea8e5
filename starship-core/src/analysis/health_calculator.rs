//! Health Score Calculator
//!
//! Module health is driven by the maintainability index; repository health
//! is the size-weighted mean over modules.

use crate::constants::{HealthScoreThresholds, SeverityWeights};
use crate::models::Module;

#[derive(Debug, Clone, Copy, Default)]
pub struct HealthCalculator;

impl HealthCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Health of a module from the maintainability indices of its files
    pub fn module_health(&self, maintainability: &[f64]) -> f64 {
        if maintainability.is_empty() {
            return HealthScoreThresholds::NO_DATA_HEALTH;
        }
        let avg = maintainability.iter().sum::<f64>() / maintainability.len() as f64;
        HealthScoreThresholds::health_from_maintainability(avg)
    }

    /// Size-weighted mean of module health; an unweighted mean when every module is empty
    pub fn repository_health(&self, modules: &[Module]) -> f64 {
        if modules.is_empty() {
            return HealthScoreThresholds::NO_DATA_HEALTH;
        }
        let total_size: usize = modules.iter().map(|module| module.size).sum();
        let health = if total_size == 0 {
            modules.iter().map(|module| module.health).sum::<f64>() / modules.len() as f64
        } else {
            modules
                .iter()
                .map(|module| module.health * module.size as f64)
                .sum::<f64>()
                / total_size as f64
        };
        health.clamp(0.0, 1.0)
    }

    pub fn tech_debt(&self, complexity: f64, documentation: f64, yagni: f64, coupling: f64) -> f64 {
        SeverityWeights::tech_debt(complexity, documentation, yagni, coupling)
    }
}
