//! Structure Analyzer
//!
//! Partitions the inventoried files into top-level modules. Files directly
//! under the root form the synthetic root module, keyed `.` so that no
//! directory name can collide with it.

use super::Analyzer;
use crate::constants::ModuleTypePolicy;
use crate::models::{ModuleType, SourceSnapshot};
use crate::{AnalysisConfig, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Id of the module holding root-level files
pub const ROOT_MODULE_ID: &str = ".";

/// Files of one top-level module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModulePartition {
    pub id: String,
    pub name: String,
    pub path: String,
    pub module_type: ModuleType,
    /// Every member path, failed files included
    pub files: Vec<String>,
    /// Lines of the successfully parsed members
    pub size: usize,
    pub failed_files: usize,
}

impl ModulePartition {
    fn new(id: &str, name: &str, path: &str, module_type: ModuleType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            path: path.to_string(),
            module_type,
            files: Vec::new(),
            size: 0,
            failed_files: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureReport {
    pub root_name: String,
    /// Root module first, then by id
    pub modules: Vec<ModulePartition>,
    pub total_files: usize,
    pub total_lines: usize,
}

impl StructureReport {
    pub fn module(&self, id: &str) -> Option<&ModulePartition> {
        self.modules.iter().find(|module| module.id == id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StructureAnalyzer {
    policy: ModuleTypePolicy,
}

impl StructureAnalyzer {
    pub fn new(policy: ModuleTypePolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.module_types.clone())
    }
}

impl Analyzer for StructureAnalyzer {
    type Report = StructureReport;

    fn name(&self) -> &'static str {
        "structure"
    }

    fn analyze(&self, snapshot: &SourceSnapshot) -> Result<StructureReport> {
        let mut root: Option<ModulePartition> = None;
        let mut dirs: BTreeMap<String, ModulePartition> = BTreeMap::new();

        for file in &snapshot.files {
            let partition = match file.top_level_dir() {
                Some(dir) => dirs.entry(dir.to_string()).or_insert_with(|| {
                    ModulePartition::new(dir, dir, &format!("/{dir}"), self.policy.classify(Some(dir)))
                }),
                None => root.get_or_insert_with(|| {
                    ModulePartition::new(
                        ROOT_MODULE_ID,
                        &snapshot.root_name,
                        "/",
                        self.policy.classify(None),
                    )
                }),
            };
            partition.files.push(file.path.clone());
            if file.parsed().is_some() {
                partition.size += file.line_count;
            } else {
                partition.failed_files += 1;
            }
        }

        let modules: Vec<ModulePartition> = root.into_iter().chain(dirs.into_values()).collect();
        let total_lines = modules.iter().map(|module| module.size).sum();

        info!(modules = modules.len(), files = snapshot.files.len(), "structure analysis complete");

        Ok(StructureReport {
            root_name: snapshot.root_name.clone(),
            modules,
            total_files: snapshot.files.len(),
            total_lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileError, FileErrorKind, SourceFile, SymbolTable};
    use crate::parsers::SourceLanguage;
    use std::path::PathBuf;

    fn file(path: &str, lines: usize, failed: bool) -> SourceFile {
        SourceFile {
            path: path.to_string(),
            language: SourceLanguage::Python,
            line_count: lines,
            symbols: (!failed).then(SymbolTable::default),
            error: failed.then(|| FileError {
                file: path.to_string(),
                kind: FileErrorKind::Parse,
                message: "bad".to_string(),
            }),
        }
    }

    #[test]
    fn test_partition_covers_every_file_once() -> Result<()> {
        let snapshot = SourceSnapshot {
            root: PathBuf::from("/work/shop"),
            root_name: "shop".to_string(),
            files: vec![
                file("app.py", 10, false),
                file("core/models.py", 40, false),
                file("core/views.py", 5, true),
                file("utils/text.py", 20, false),
            ],
        };
        let report = StructureAnalyzer::default().analyze(&snapshot)?;

        let ids: Vec<&str> = report.modules.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec![ROOT_MODULE_ID, "core", "utils"]);

        let members: usize = report.modules.iter().map(|m| m.files.len()).sum();
        assert_eq!(members, snapshot.files.len());

        let root = report.module(ROOT_MODULE_ID).map(|m| (m.name.as_str(), m.path.as_str(), m.module_type));
        assert_eq!(root, Some(("shop", "/", ModuleType::Core)));

        let core = report.module("core").map(|m| (m.size, m.failed_files, m.files.len()));
        assert_eq!(core, Some((40, 1, 2)));
        assert_eq!(report.module("utils").map(|m| m.module_type), Some(ModuleType::Utility));
        assert_eq!(report.total_lines, 70);
        Ok(())
    }

    #[test]
    fn test_no_root_module_without_root_files() -> Result<()> {
        let snapshot = SourceSnapshot {
            root: PathBuf::from("/work/x"),
            root_name: "x".to_string(),
            files: vec![file("pkg/a.py", 3, false)],
        };
        let report = StructureAnalyzer::default().analyze(&snapshot)?;
        assert_eq!(report.modules.len(), 1);
        assert_eq!(report.modules[0].module_type, ModuleType::Module);
        Ok(())
    }

    #[test]
    fn test_directory_named_root_keeps_its_own_module() -> Result<()> {
        let snapshot = SourceSnapshot {
            root: PathBuf::from("/work/site"),
            root_name: "site".to_string(),
            files: vec![file("manage.py", 4, false), file("root/urls.py", 6, false)],
        };
        let report = StructureAnalyzer::default().analyze(&snapshot)?;

        let ids: Vec<&str> = report.modules.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec![ROOT_MODULE_ID, "root"]);
        let synthetic = report.module(ROOT_MODULE_ID).map(|m| (m.path.as_str(), m.files.clone()));
        assert_eq!(synthetic, Some(("/", vec!["manage.py".to_string()])));
        let directory = report.module("root").map(|m| (m.path.as_str(), m.size));
        assert_eq!(directory, Some(("/root", 6)));
        Ok(())
    }
}
