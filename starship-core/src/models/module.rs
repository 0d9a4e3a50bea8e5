//! Module aggregate model

use crate::constants::HealthScoreThresholds;
use serde::{Deserialize, Serialize};

/// Type tag derived from the module's directory name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Core,
    Utility,
    Test,
    Config,
    Module,
}

impl std::fmt::Display for ModuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Core => write!(f, "core"),
            Self::Utility => write!(f, "utility"),
            Self::Test => write!(f, "test"),
            Self::Config => write!(f, "config"),
            Self::Module => write!(f, "module"),
        }
    }
}

/// Health bucket of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Critical,
    Warning,
    Healthy,
    Optimal,
}

impl HealthStatus {
    pub fn from_health(health: f64) -> Self {
        if health < HealthScoreThresholds::CRITICAL_BELOW {
            Self::Critical
        } else if health < HealthScoreThresholds::WARNING_BELOW {
            Self::Warning
        } else if health < HealthScoreThresholds::HEALTHY_BELOW {
            Self::Healthy
        } else {
            Self::Optimal
        }
    }
}

/// One top-level module of the analyzed tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub name: String,
    pub path: String,
    /// Every inventoried member, failed files included
    pub files: Vec<String>,
    /// Total lines of the successfully parsed members
    pub size: usize,
    /// Complexity score in [0, 100]
    pub complexity: f64,
    /// Documentation score in [0, 100]
    pub documentation: f64,
    /// YAGNI score in [0, 100]
    pub yagni: f64,
    /// Composite health in [0, 1]
    pub health: f64,
    pub status: HealthStatus,
    #[serde(rename = "type")]
    pub module_type: ModuleType,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}
