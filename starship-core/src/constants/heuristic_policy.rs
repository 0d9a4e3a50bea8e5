//! Name-matching rules of the over-engineering heuristics.
//!
//! Everything the YAGNI detector decides by name lives here so the
//! matching can be tuned from configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicPolicy {
    /// Function names never reported as unused
    pub always_used: Vec<String>,
    /// Substrings of a base class marking it abstract
    pub abstract_base_markers: Vec<String>,
    /// Substring of a decorator marking an abstract method
    pub abstract_decorator_marker: String,
    /// Substring of a decorator marking a cache
    pub cache_decorator_marker: String,
    /// Cached functions with fewer body statements than this are premature
    pub premature_cache_max_statements: usize,
    /// Share of delegating methods above which a class is a wrapper
    pub wrapper_delegation_ratio: f64,
    /// Abstract classes with at most this many subclasses are flagged
    pub max_implementations: usize,
    /// Heavyweight container constructors
    pub heavyweight_containers: Vec<String>,
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self {
            always_used: ["__init__", "__str__", "__repr__", "main"]
                .into_iter()
                .map(String::from)
                .collect(),
            abstract_base_markers: vec!["ABC".to_string()],
            abstract_decorator_marker: "abstract".to_string(),
            cache_decorator_marker: "cache".to_string(),
            premature_cache_max_statements: 5,
            wrapper_delegation_ratio: 0.8,
            max_implementations: 1,
            heavyweight_containers: ["OrderedDict", "deque", "ChainMap"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl HeuristicPolicy {
    pub fn is_always_used(&self, name: &str) -> bool {
        self.always_used.iter().any(|used| used == name)
    }

    /// Checks the last dotted segment so `abc.ABC` matches as well
    pub fn is_abstract_base(&self, base: &str) -> bool {
        let name = last_segment(base);
        self.abstract_base_markers.iter().any(|marker| name.contains(marker.as_str()))
    }

    pub fn is_abstract_decorator(&self, decorator: &str) -> bool {
        decorator.contains(self.abstract_decorator_marker.as_str())
    }

    pub fn is_cache_decorator(&self, decorator: &str) -> bool {
        decorator
            .to_lowercase()
            .contains(&self.cache_decorator_marker.to_lowercase())
    }

    pub fn is_heavyweight_container(&self, callee: &str) -> bool {
        let name = last_segment(callee);
        self.heavyweight_containers.iter().any(|container| container == name)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.wrapper_delegation_ratio > 0.0 && self.wrapper_delegation_ratio <= 1.0) {
            return Err(format!(
                "wrapper_delegation_ratio must be in (0, 1], got {}",
                self.wrapper_delegation_ratio
            ));
        }
        if self.premature_cache_max_statements == 0 {
            return Err("premature_cache_max_statements must be positive".to_string());
        }
        if self.cache_decorator_marker.is_empty() || self.abstract_decorator_marker.is_empty() {
            return Err("decorator markers must not be empty".to_string());
        }
        if self.abstract_base_markers.iter().any(String::is_empty) {
            return Err("abstract_base_markers must not contain an empty marker".to_string());
        }
        Ok(())
    }
}

/// Last segment of a dotted name
pub(crate) fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches() {
        let policy = HeuristicPolicy::default();
        assert!(policy.is_always_used("__init__"));
        assert!(policy.is_always_used("main"));
        assert!(!policy.is_always_used("helper"));
        assert!(policy.is_abstract_base("ABC"));
        assert!(policy.is_abstract_base("abc.ABCMeta"));
        assert!(!policy.is_abstract_base("Base"));
        assert!(policy.is_abstract_decorator("abc.abstractmethod"));
        assert!(policy.is_cache_decorator("functools.lru_cache"));
        assert!(policy.is_cache_decorator("Cached"));
        assert!(policy.is_heavyweight_container("collections.OrderedDict"));
        assert!(!policy.is_heavyweight_container("dict"));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_invalid_ratio() {
        let policy = HeuristicPolicy { wrapper_delegation_ratio: 1.5, ..Default::default() };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_empty_abstract_marker_is_rejected() {
        let policy = HeuristicPolicy {
            abstract_base_markers: vec!["ABC".to_string(), String::new()],
            ..Default::default()
        };
        assert!(policy.is_abstract_base("Base"));
        assert!(policy.validate().is_err());

        let policy = HeuristicPolicy { abstract_base_markers: Vec::new(), ..Default::default() };
        assert!(!policy.is_abstract_base("ABC"));
        assert!(policy.validate().is_ok());
    }
}
