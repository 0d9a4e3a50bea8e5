//! Dependency Graph Builder
//!
//! Classifies every import as standard, internal or external, builds the
//! internal file graph, detects cycles and derives coupling. Declared
//! requirements from `requirements.txt` and `pyproject.toml` ride along.

use super::Analyzer;
use crate::graph::{DependencyGraph, InternalEdge};
use crate::models::{ImportStatement, SourceFile, SourceSnapshot, SymbolTable};
use crate::{AnalysisConfig, Result};
use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

lazy_static! {
    static ref REQUIREMENT_RE: Regex =
        Regex::new(r"^\s*([A-Za-z0-9][A-Za-z0-9._-]*)\s*(.*)$").expect("valid requirement regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Standard,
    Internal,
    External,
}

/// One classified import of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEdge {
    pub source: String,
    /// Resolved file for internal imports, package id for external ones,
    /// the module as written otherwise
    pub target: String,
    pub kind: ImportKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCount {
    pub module: String,
    pub count: usize,
}

/// A dependency declared in a packaging manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredRequirement {
    pub name: String,
    pub specifier: Option<String>,
    /// Manifest file the entry came from
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyReport {
    pub files_analyzed: usize,
    /// Distinct import targets per file, summed over files
    pub total_imports: usize,
    pub avg_imports_per_file: f64,
    /// `100 - clamp(avg_imports_per_file * 10, 0, 100)`
    pub coupling_score: f64,
    pub unique_external_dependencies: usize,
    pub external_dependencies: Vec<String>,
    pub standard_library: Vec<String>,
    pub internal_edges: Vec<InternalEdge>,
    pub circular_dependencies: Vec<Vec<String>>,
    pub most_imported: Vec<ImportCount>,
    pub imports: Vec<ImportEdge>,
    pub declared_requirements: Vec<DeclaredRequirement>,
}

/// Dotted module names of the inventoried files
#[derive(Debug, Default)]
struct ModuleIndex {
    modules: HashMap<String, String>,
    packages: HashSet<String>,
}

impl ModuleIndex {
    fn build(snapshot: &SourceSnapshot, source_roots: &[String]) -> Self {
        let mut index = Self::default();
        for file in &snapshot.files {
            let mut variants = vec![file.path.as_str()];
            for root in source_roots {
                let prefix = format!("{}/", root.trim_matches('/'));
                if let Some(stripped) = file.path.strip_prefix(&prefix) {
                    variants.push(stripped);
                }
            }
            for variant in variants {
                let dotted = dotted_module_name(variant);
                let mut segments: Vec<&str> = dotted.split('.').collect();
                index
                    .modules
                    .entry(dotted.clone())
                    .or_insert_with(|| file.path.clone());
                while segments.len() > 1 {
                    segments.pop();
                    index.packages.insert(segments.join("."));
                }
            }
        }
        index
    }

    fn exact(&self, dotted: &str) -> Option<&str> {
        self.modules.get(dotted).map(String::as_str)
    }

    /// Longest dotted prefix of `dotted` that names a file
    fn longest_prefix(&self, dotted: &str) -> Option<&str> {
        let segments: Vec<&str> = dotted.split('.').collect();
        (1..=segments.len())
            .rev()
            .find_map(|len| self.exact(&segments[..len].join(".")))
    }

    fn is_package(&self, dotted: &str) -> bool {
        let segments: Vec<&str> = dotted.split('.').collect();
        (1..=segments.len()).any(|len| self.packages.contains(&segments[..len].join(".")))
    }

    /// Files an import statement resolves to
    fn resolve(&self, dotted: &str, import: &ImportStatement) -> Vec<String> {
        if import.is_from_import {
            let named: Vec<String> = import
                .names
                .iter()
                .filter(|name| name.as_str() != "*")
                .filter_map(|name| self.exact(&join_dotted(dotted, name)))
                .map(str::to_string)
                .collect();
            if !named.is_empty() {
                return named;
            }
        }
        if dotted.is_empty() {
            return Vec::new();
        }
        self.longest_prefix(dotted).map(str::to_string).into_iter().collect()
    }
}

/// `pkg/sub/mod.py` becomes `pkg.sub.mod`; `pkg/__init__.py` becomes `pkg`
fn dotted_module_name(path: &str) -> String {
    let without_extension = match path.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() && !stem.ends_with('/') => stem,
        _ => path,
    };
    let dotted = without_extension.replace('/', ".");
    match dotted.strip_suffix("__init__") {
        Some(package) => package.trim_end_matches('.').to_string(),
        None => dotted,
    }
}

fn join_dotted(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}.{name}")
    }
}

/// Absolute dotted name of a relative import, `None` when it climbs above the root
fn resolve_relative(source_path: &str, module: &str) -> Option<String> {
    let dots = module.chars().take_while(|&c| c == '.').count();
    let remainder = &module[dots..];
    let mut package: Vec<&str> = source_path.split('/').collect();
    package.pop();
    for _ in 1..dots {
        package.pop()?;
    }
    let base = package.join(".");
    Some(join_dotted(&base, remainder).trim_matches('.').to_string())
}

/// Imports of one file after classification
#[derive(Debug, Default)]
struct FileImports {
    edges: Vec<ImportEdge>,
    /// Distinct targets in first-seen order
    targets: Vec<String>,
    internal_links: BTreeSet<String>,
    external: BTreeSet<String>,
    standard: BTreeSet<String>,
}

impl FileImports {
    fn record(&mut self, source: &str, target: String, kind: ImportKind, line: usize) {
        match kind {
            ImportKind::External => {
                self.external.insert(target.clone());
            }
            ImportKind::Standard => {
                self.standard.insert(target.clone());
            }
            ImportKind::Internal => {}
        }
        if !self.targets.contains(&target) {
            self.targets.push(target.clone());
        }
        self.edges.push(ImportEdge {
            source: source.to_string(),
            target,
            kind,
            line,
        });
    }
}

#[derive(Debug, Clone)]
pub struct DependencyAnalyzer {
    source_roots: Vec<String>,
    most_imported_limit: usize,
}

impl Default for DependencyAnalyzer {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl DependencyAnalyzer {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            source_roots: config.source_roots.clone(),
            most_imported_limit: config.most_imported_limit,
        }
    }

    fn classify_file(&self, index: &ModuleIndex, file: &SourceFile, symbols: &SymbolTable) -> FileImports {
        let mut imports = FileImports::default();
        for import in &symbols.imports {
            if import.is_relative() {
                let resolved = resolve_relative(&file.path, &import.module)
                    .map(|dotted| index.resolve(&dotted, import))
                    .unwrap_or_default();
                if resolved.is_empty() {
                    imports.record(&file.path, import.module.clone(), ImportKind::Internal, import.line);
                }
                for target in resolved {
                    imports.internal_links.insert(target.clone());
                    imports.record(&file.path, target, ImportKind::Internal, import.line);
                }
                continue;
            }

            let root = import.root_segment();
            if file.language.is_standard_module(root) {
                imports.record(&file.path, import.module.clone(), ImportKind::Standard, import.line);
                continue;
            }

            let resolved = index.resolve(&import.module, import);
            if !resolved.is_empty() {
                for target in resolved {
                    imports.internal_links.insert(target.clone());
                    imports.record(&file.path, target, ImportKind::Internal, import.line);
                }
            } else if index.is_package(&import.module) {
                imports.record(&file.path, import.module.clone(), ImportKind::Internal, import.line);
            } else {
                imports.record(&file.path, root.to_string(), ImportKind::External, import.line);
            }
        }
        debug!(file = %file.path, imports = imports.edges.len(), "imports classified");
        imports
    }
}

impl Analyzer for DependencyAnalyzer {
    type Report = DependencyReport;

    fn name(&self) -> &'static str {
        "dependencies"
    }

    fn analyze(&self, snapshot: &SourceSnapshot) -> Result<DependencyReport> {
        let index = ModuleIndex::build(snapshot, &self.source_roots);
        let per_file: Vec<(&str, FileImports)> = snapshot
            .files
            .par_iter()
            .filter_map(|file| {
                file.parsed()
                    .map(|symbols| (file.path.as_str(), self.classify_file(&index, file, symbols)))
            })
            .collect();

        let parsed: HashSet<&str> = per_file.iter().map(|(path, _)| *path).collect();
        let mut graph = DependencyGraph::new();
        let mut counts: Vec<ImportCount> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut standard = BTreeSet::new();
        let mut imports = Vec::new();
        let mut total_imports = 0;

        for (path, file_imports) in per_file {
            graph.add_node(path);
            for link in &file_imports.internal_links {
                if parsed.contains(link.as_str()) {
                    graph.add_edge(path, link);
                }
            }
            for package in &file_imports.external {
                graph.add_external(package);
            }
            total_imports += file_imports.targets.len();
            for target in file_imports.targets {
                match positions.get(&target) {
                    Some(&position) => counts[position].count += 1,
                    None => {
                        positions.insert(target.clone(), counts.len());
                        counts.push(ImportCount { module: target, count: 1 });
                    }
                }
            }
            standard.extend(file_imports.standard);
            imports.extend(file_imports.edges);
        }

        // Stable sort keeps first-seen order among equal counts
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(self.most_imported_limit);

        let files_analyzed = parsed.len();
        let avg_imports_per_file = if files_analyzed == 0 {
            0.0
        } else {
            total_imports as f64 / files_analyzed as f64
        };
        let coupling_score = 100.0 - (avg_imports_per_file * 10.0).clamp(0.0, 100.0);
        let circular_dependencies = graph.cycles();
        let external_dependencies: Vec<String> = graph.external_packages().iter().cloned().collect();

        info!(
            files = files_analyzed,
            internal_edges = graph.edge_count(),
            external = external_dependencies.len(),
            cycles = circular_dependencies.len(),
            "dependency analysis complete"
        );

        Ok(DependencyReport {
            files_analyzed,
            total_imports,
            avg_imports_per_file,
            coupling_score,
            unique_external_dependencies: external_dependencies.len(),
            external_dependencies,
            standard_library: standard.into_iter().collect(),
            internal_edges: graph.edges(),
            circular_dependencies,
            most_imported: counts,
            imports,
            declared_requirements: declared_requirements(&snapshot.root),
        })
    }
}

/// Requirements declared in `requirements.txt` and `pyproject.toml` at `root`
pub fn declared_requirements(root: &Path) -> Vec<DeclaredRequirement> {
    let mut requirements = Vec::new();

    let requirements_txt = root.join("requirements.txt");
    if requirements_txt.is_file() {
        match std::fs::read_to_string(&requirements_txt) {
            Ok(content) => requirements.extend(parse_requirements_txt(&content)),
            Err(e) => warn!(error = %e, "failed to read requirements.txt"),
        }
    }

    let pyproject = root.join("pyproject.toml");
    if pyproject.is_file() {
        match std::fs::read_to_string(&pyproject) {
            Ok(content) => requirements.extend(parse_pyproject(&content)),
            Err(e) => warn!(error = %e, "failed to read pyproject.toml"),
        }
    }
    requirements
}

fn parse_requirement(entry: &str, source: &str) -> Option<DeclaredRequirement> {
    let captures = REQUIREMENT_RE.captures(entry)?;
    let specifier = captures
        .get(2)
        .map(|m| m.as_str().trim())
        .filter(|spec| !spec.is_empty())
        .map(str::to_string);
    Some(DeclaredRequirement {
        name: captures.get(1)?.as_str().to_string(),
        specifier,
        source: source.to_string(),
    })
}

fn parse_requirements_txt(content: &str) -> Vec<DeclaredRequirement> {
    content
        .lines()
        .map(|line| line.split_once('#').map_or(line, |(before, _)| before).trim())
        .filter(|line| !line.is_empty() && !line.starts_with('-'))
        .filter_map(|line| parse_requirement(line, "requirements.txt"))
        .collect()
}

fn parse_pyproject(content: &str) -> Vec<DeclaredRequirement> {
    let document: toml::Value = match toml::from_str(content) {
        Ok(document) => document,
        Err(e) => {
            warn!(error = %e, "failed to parse pyproject.toml");
            return Vec::new();
        }
    };

    let mut requirements: Vec<DeclaredRequirement> = document
        .get("project")
        .and_then(|project| project.get("dependencies"))
        .and_then(toml::Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(toml::Value::as_str)
                .filter_map(|entry| parse_requirement(entry, "pyproject.toml"))
                .collect()
        })
        .unwrap_or_default();

    if let Some(poetry) = document
        .get("tool")
        .and_then(|tool| tool.get("poetry"))
        .and_then(|poetry| poetry.get("dependencies"))
        .and_then(toml::Value::as_table)
    {
        for (name, value) in poetry {
            if name == "python" {
                continue;
            }
            let specifier = match value {
                toml::Value::String(version) => Some(version.clone()),
                toml::Value::Table(table) => table
                    .get("version")
                    .and_then(toml::Value::as_str)
                    .map(str::to_string),
                _ => None,
            };
            requirements.push(DeclaredRequirement {
                name: name.clone(),
                specifier,
                source: "pyproject.toml".to_string(),
            });
        }
    }
    requirements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::SourceLanguage;
    use std::path::PathBuf;

    fn import(module: &str, names: &[&str]) -> ImportStatement {
        ImportStatement {
            module: module.to_string(),
            names: names.iter().map(|n| (*n).to_string()).collect(),
            alias: None,
            is_from_import: !names.is_empty(),
            line: 1,
        }
    }

    fn file(path: &str, imports: Vec<ImportStatement>) -> SourceFile {
        SourceFile {
            path: path.to_string(),
            language: SourceLanguage::Python,
            line_count: 1,
            symbols: Some(SymbolTable { imports, ..Default::default() }),
            error: None,
        }
    }

    fn snapshot(files: Vec<SourceFile>) -> SourceSnapshot {
        SourceSnapshot {
            root: PathBuf::from("/nonexistent-starship-root"),
            root_name: "repo".to_string(),
            files,
        }
    }

    #[test]
    fn test_dotted_module_names() {
        assert_eq!(dotted_module_name("pkg/sub/mod.py"), "pkg.sub.mod");
        assert_eq!(dotted_module_name("pkg/__init__.py"), "pkg");
        assert_eq!(dotted_module_name("setup.py"), "setup");
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve_relative("pkg/sub/a.py", ".b").as_deref(), Some("pkg.sub.b"));
        assert_eq!(resolve_relative("pkg/sub/a.py", "..x.y").as_deref(), Some("pkg.x.y"));
        assert_eq!(resolve_relative("pkg/a.py", ".").as_deref(), Some("pkg"));
        assert_eq!(resolve_relative("a.py", "..up"), None);
    }

    #[test]
    fn test_classification() -> Result<()> {
        let report = DependencyAnalyzer::default().analyze(&snapshot(vec![
            file("app/main.py", vec![
                import("os.path", &[]),
                import("requests", &[]),
                import("app.models", &[]),
                import(".", &["views"]),
                import("core", &["engine"]),
            ]),
            file("app/models.py", vec![import("requests.adapters", &["HTTPAdapter"])]),
            file("app/views.py", vec![]),
            file("src/core/engine.py", vec![]),
        ]))?;

        let kinds: Vec<(String, ImportKind)> = report
            .imports
            .iter()
            .filter(|edge| edge.source == "app/main.py")
            .map(|edge| (edge.target.clone(), edge.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("os.path".to_string(), ImportKind::Standard),
                ("requests".to_string(), ImportKind::External),
                ("app/models.py".to_string(), ImportKind::Internal),
                ("app/views.py".to_string(), ImportKind::Internal),
                ("src/core/engine.py".to_string(), ImportKind::Internal),
            ]
        );
        assert_eq!(report.external_dependencies, vec!["requests"]);
        assert_eq!(report.internal_edges.len(), 3);
        assert_eq!(report.total_imports, 6);
        assert_eq!(report.most_imported[0], ImportCount { module: "requests".into(), count: 2 });
        assert!(report.circular_dependencies.is_empty());
        Ok(())
    }

    #[test]
    fn test_coupling_and_cycles() -> Result<()> {
        let report = DependencyAnalyzer::default().analyze(&snapshot(vec![
            file("a.py", vec![import("b", &[])]),
            file("b.py", vec![import("c", &[])]),
            file("c.py", vec![import("a", &[])]),
        ]))?;
        assert_eq!(report.circular_dependencies, vec![vec!["a.py", "b.py", "c.py"]]);
        assert_eq!(report.avg_imports_per_file, 1.0);
        assert_eq!(report.coupling_score, 90.0);
        Ok(())
    }

    #[test]
    fn test_most_imported_ties_keep_first_seen_order() -> Result<()> {
        let report = DependencyAnalyzer::default().analyze(&snapshot(vec![
            file("a.py", vec![import("zeta", &[]), import("alpha", &[])]),
            file("b.py", vec![import("alpha", &[]), import("zeta", &[]), import("mid", &[])]),
        ]))?;
        let modules: Vec<&str> = report.most_imported.iter().map(|c| c.module.as_str()).collect();
        assert_eq!(modules, vec!["zeta", "alpha", "mid"]);
        Ok(())
    }

    #[test]
    fn test_empty_snapshot_is_not_degenerate() -> Result<()> {
        let report = DependencyAnalyzer::default().analyze(&snapshot(vec![]))?;
        assert_eq!(report.coupling_score, 100.0);
        assert_eq!(report.total_imports, 0);
        Ok(())
    }

    #[test]
    fn test_requirements_parsing() {
        let parsed = parse_requirements_txt(
            "# deps\nrequests>=2.31  # http\n-r base.txt\n\nnumpy\nDjango[argon2]==4.2\n",
        );
        let names: Vec<&str> = parsed.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["requests", "numpy", "Django"]);
        assert_eq!(parsed[0].specifier.as_deref(), Some(">=2.31"));
        assert_eq!(parsed[1].specifier, None);
    }

    #[test]
    fn test_pyproject_parsing() {
        let parsed = parse_pyproject(
            r#"
[project]
dependencies = ["httpx>=0.27", "rich"]

[tool.poetry.dependencies]
python = "^3.11"
pydantic = { version = "^2.0" }
"#,
        );
        let names: Vec<&str> = parsed.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["httpx", "rich", "pydantic"]);
        assert_eq!(parsed[2].specifier.as_deref(), Some("^2.0"));
        assert!(parse_pyproject("not = [valid").is_empty());
    }

    #[test]
    fn test_declared_requirements_from_disk() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("requirements.txt"), "flask\n")?;
        let declared = declared_requirements(dir.path());
        assert_eq!(declared.len(), 1);
        assert_eq!(declared[0].source, "requirements.txt");
        Ok(())
    }
}
