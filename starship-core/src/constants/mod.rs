//! Constants module for Starship core
//!
//! Threshold values and the tunable name policies used by the analyzers.

pub mod complexity_thresholds;
pub mod health_score_thresholds;
pub mod heuristic_policy;
pub mod module_types;

pub use complexity_thresholds::{ComplexityRank, ComplexityThresholds, MaintainabilityRank};
pub use health_score_thresholds::{DocumentationThresholds, HealthScoreThresholds, SeverityWeights};
pub use heuristic_policy::HeuristicPolicy;
pub use module_types::ModuleTypePolicy;
