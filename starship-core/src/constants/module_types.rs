//! Directory-name policy that tags modules with a type.

use crate::models::module::ModuleType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleTypePolicy {
    pub core: Vec<String>,
    pub utility: Vec<String>,
    pub test: Vec<String>,
    pub config: Vec<String>,
}

impl Default for ModuleTypePolicy {
    fn default() -> Self {
        fn names(list: &[&str]) -> Vec<String> {
            list.iter().map(|name| (*name).to_string()).collect()
        }
        Self {
            core: names(&["core", "src", "app", "kernel"]),
            utility: names(&["lib", "utils", "util", "helpers", "common", "api"]),
            test: names(&["tests", "test", "testing"]),
            config: names(&["config", "settings", "conf"]),
        }
    }
}

impl ModuleTypePolicy {
    /// Type of the module rooted at directory `name`; `None` is the synthetic root
    pub fn classify(&self, name: Option<&str>) -> ModuleType {
        let Some(name) = name else {
            return ModuleType::Core;
        };
        let name = name.to_lowercase();
        let contains = |list: &[String]| list.iter().any(|entry| entry.eq_ignore_ascii_case(&name));
        if contains(&self.core) {
            ModuleType::Core
        } else if contains(&self.utility) {
            ModuleType::Utility
        } else if contains(&self.test) {
            ModuleType::Test
        } else if contains(&self.config) {
            ModuleType::Config
        } else {
            ModuleType::Module
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let policy = ModuleTypePolicy::default();
        assert_eq!(policy.classify(None), ModuleType::Core);
        assert_eq!(policy.classify(Some("core")), ModuleType::Core);
        assert_eq!(policy.classify(Some("Utils")), ModuleType::Utility);
        assert_eq!(policy.classify(Some("tests")), ModuleType::Test);
        assert_eq!(policy.classify(Some("settings")), ModuleType::Config);
        assert_eq!(policy.classify(Some("billing")), ModuleType::Module);
    }
}
