//! Python parser backed by tree-sitter
//!
//! Walks the concrete syntax tree three times: once for definitions
//! (functions, classes, docstrings, branch points), once for name usage
//! (calls and read references) and once for file-wide facts (imports,
//! assignments, comments, Halstead operators).

use super::{SourceLanguage, SourceParser};
use crate::models::{
    Assignment, ClassSymbol, FunctionSymbol, HalsteadCounts, ImportStatement, RawMetrics,
    SymbolTable,
};
use crate::{Error, Result};
use lazy_static::lazy_static;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tree_sitter::{Node, Parser};

lazy_static! {
    /// Modules shipped with the Python runtime, matched on the first dotted segment
    static ref STANDARD_MODULES: HashSet<&'static str> = [
        "__future__", "abc", "argparse", "ast", "asyncio", "base64", "bisect", "builtins",
        "collections", "concurrent", "configparser", "contextlib", "copy", "csv", "dataclasses",
        "datetime", "decimal", "enum", "fractions", "functools", "glob", "gzip", "hashlib",
        "heapq", "hmac", "html", "http", "inspect", "io", "itertools", "json", "logging", "math",
        "multiprocessing", "operator", "os", "pathlib", "pickle", "platform", "pprint", "queue",
        "random", "re", "secrets", "shutil", "signal", "socket", "sqlite3", "statistics",
        "string", "struct", "subprocess", "sys", "tarfile", "tempfile", "textwrap", "threading",
        "time", "traceback", "typing", "unittest", "urllib", "uuid", "warnings", "weakref",
        "xml", "zipfile",
    ]
    .into_iter()
    .collect();
}

/// Node kinds that add one decision point
const DECISION_KINDS: &[&str] = &[
    "if_statement",
    "elif_clause",
    "conditional_expression",
    "for_statement",
    "while_statement",
    "for_in_clause",
    "if_clause",
    "except_clause",
    "except_group_clause",
    "boolean_operator",
    "case_clause",
];

/// Node kinds whose tokens feed the Halstead counts
const OPERATOR_KINDS: &[&str] = &[
    "binary_operator",
    "boolean_operator",
    "comparison_operator",
    "unary_operator",
    "not_operator",
    "augmented_assignment",
];

/// Syntax trees deeper than this are rejected as unparseable
pub const MAX_NESTING_DEPTH: usize = 1_000;

pub(crate) fn is_standard_module(module: &str) -> bool {
    STANDARD_MODULES.contains(module)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PythonParser;

impl PythonParser {
    pub fn new() -> Self {
        Self
    }
}

impl SourceParser for PythonParser {
    fn language(&self) -> SourceLanguage {
        SourceLanguage::Python
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse(&self, path: &Path, source: &str) -> Result<SymbolTable> {
        // Parser is not Sync; one per call keeps the capability shareable
        let mut parser = Parser::new();
        parser
            .set_language(tree_sitter_python::language())
            .map_err(|e| Error::Parse(format!("failed to load Python grammar: {e}")))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| Error::Parse(format!("{}: parser produced no tree", path.display())))?;
        let root = tree.root_node();

        if root.has_error() {
            let line = first_error_line(root).unwrap_or(1);
            return Err(Error::Parse(format!(
                "{}: syntax error near line {line}",
                path.display()
            )));
        }
        if let Some(line) = first_line_deeper_than(root, MAX_NESTING_DEPTH) {
            return Err(Error::Parse(format!(
                "{}: nesting deeper than {MAX_NESTING_DEPTH} levels near line {line}",
                path.display()
            )));
        }

        let mut collector = SymbolCollector::new(source.as_bytes());
        collector.module_docstring(root);
        collector.visit_definitions(root);
        collector.visit_usage(root);
        collector.visit_facts(root);
        Ok(collector.finish(root, source))
    }
}

struct SymbolCollector<'a> {
    source: &'a [u8],
    table: SymbolTable,
    comment_rows: BTreeSet<usize>,
    operators: HashSet<String>,
    operands: HashSet<String>,
}

impl<'a> SymbolCollector<'a> {
    fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            table: SymbolTable::default(),
            comment_rows: BTreeSet::new(),
            operators: HashSet::new(),
            operands: HashSet::new(),
        }
    }

    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source).unwrap_or_default()
    }

    fn field_text(&self, node: Node, field: &str) -> Option<String> {
        node.child_by_field_name(field).map(|child| self.text(child).to_string())
    }

    fn module_docstring(&mut self, root: Node) {
        self.table.module_docstring = self.docstring_of(root);
    }

    /// Docstring of a module or block: a leading string expression statement
    fn docstring_of(&self, body: Node) -> Option<String> {
        let first = named_children(body)
            .into_iter()
            .find(|child| child.kind() != "comment")?;
        if first.kind() != "expression_statement" || first.named_child_count() != 1 {
            return None;
        }
        let literal = first.named_child(0)?;
        if !matches!(literal.kind(), "string" | "concatenated_string") {
            return None;
        }
        normalize_docstring(self.text(literal))
    }

    /// Functions and classes in source order. `Option<usize>` on the stack is
    /// the index of the directly enclosing class.
    fn visit_definitions(&mut self, root: Node) {
        let mut pending: Vec<(Node, Option<usize>)> = vec![(root, None)];
        while let Some((node, class_index)) = pending.pop() {
            let inner = match node.kind() {
                "function_definition" => {
                    let class_name = class_index.map(|index| self.table.classes[index].name.clone());
                    let function = self.function_symbol(node, class_name);
                    if let Some(index) = class_index {
                        self.table.classes[index].methods.push(function.clone());
                    }
                    self.table.functions.push(function);
                    None
                }
                "class_definition" => {
                    let class = self.class_symbol(node);
                    self.table.classes.push(class);
                    Some(self.table.classes.len() - 1)
                }
                _ => class_index,
            };
            push_in_order(&mut pending, children(node).into_iter().map(|child| (child, inner)));
        }
    }

    fn function_symbol(&self, node: Node, class_name: Option<String>) -> FunctionSymbol {
        let body = node.child_by_field_name("body");
        let statements: Vec<Node> = body
            .map(|body| {
                named_children(body)
                    .into_iter()
                    .filter(|statement| statement.kind() != "comment")
                    .collect()
            })
            .unwrap_or_default();

        let delegates_to_attribute = statements.len() == 1 && is_attribute_delegation(statements[0]);

        FunctionSymbol {
            name: self.field_text(node, "name").unwrap_or_default(),
            line: node.start_position().row + 1,
            docstring: body.and_then(|body| self.docstring_of(body)),
            decorators: self.decorators(node),
            branch_points: body.map_or(0, count_branches),
            statement_count: statements.len(),
            delegates_to_attribute,
            class_name,
        }
    }

    fn class_symbol(&self, node: Node) -> ClassSymbol {
        let mut bases = Vec::new();
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            for base in named_children(superclasses) {
                match base.kind() {
                    "identifier" | "attribute" => bases.push(self.text(base).to_string()),
                    "keyword_argument" => {
                        if self.field_text(base, "name").as_deref() == Some("metaclass") {
                            if let Some(value) = self.field_text(base, "value") {
                                bases.push(value);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        ClassSymbol {
            name: self.field_text(node, "name").unwrap_or_default(),
            line: node.start_position().row + 1,
            docstring: node
                .child_by_field_name("body")
                .and_then(|body| self.docstring_of(body)),
            bases,
            methods: Vec::new(),
        }
    }

    /// Decorator expressions of a definition, call arguments dropped
    fn decorators(&self, definition: Node) -> Vec<String> {
        let Some(parent) = definition.parent() else {
            return Vec::new();
        };
        if parent.kind() != "decorated_definition" {
            return Vec::new();
        }
        named_children(parent)
            .into_iter()
            .filter(|child| child.kind() == "decorator")
            .filter_map(|decorator| {
                let expression = named_children(decorator)
                    .into_iter()
                    .find(|child| child.kind() != "comment")?;
                let target = if expression.kind() == "call" {
                    expression.child_by_field_name("function")?
                } else {
                    expression
                };
                Some(self.text(target).trim().to_string())
            })
            .collect()
    }

    /// Calls and identifier reads. `store` marks assignment-target context.
    /// Calls and identifier reads. The flag on the stack marks assignment-target
    /// context.
    fn visit_usage(&mut self, root: Node) {
        let mut pending = vec![(root, false)];
        while let Some((node, store)) = pending.pop() {
            let next: Vec<(Node, bool)> = match node.kind() {
                "identifier" => {
                    if !store {
                        self.table.references.push(self.text(node).to_string());
                    }
                    Vec::new()
                }
                "import_statement" | "import_from_statement" | "future_import_statement"
                | "global_statement" | "nonlocal_statement" | "comment" => Vec::new(),
                "function_definition" => fields(node, &["parameters", "return_type", "body"]),
                "class_definition" => fields(node, &["superclasses", "body"]),
                "parameters" | "lambda_parameters" => named_children(node)
                    .into_iter()
                    .filter(|parameter| {
                        matches!(
                            parameter.kind(),
                            "default_parameter" | "typed_parameter" | "typed_default_parameter"
                        )
                    })
                    .flat_map(|parameter| fields(parameter, &["type", "value"]))
                    .collect(),
                "assignment" | "augmented_assignment" | "for_statement" | "for_in_clause" => {
                    marked_children(node, node.child_by_field_name("left"))
                }
                "keyword_argument" => fields(node, &["value"]),
                "attribute" => fields(node, &["object"]),
                "as_pattern" => marked_children(node, node.child_by_field_name("alias")),
                "call" => {
                    if let Some(name) =
                        node.child_by_field_name("function").and_then(|f| self.callee_name(f))
                    {
                        self.table.calls.push(name);
                    }
                    marked_children(node, None)
                }
                "subscript" | "lambda" => marked_children(node, None),
                _ => children(node).into_iter().map(|child| (child, store)).collect(),
            };
            push_in_order(&mut pending, next);
        }
    }

    /// `f(...)` yields `f`, `obj.attr(...)` yields `attr`
    fn callee_name(&self, function: Node) -> Option<String> {
        match function.kind() {
            "identifier" => Some(self.text(function).to_string()),
            "attribute" => self.field_text(function, "attribute"),
            _ => None,
        }
    }

    /// Imports, assignments, comments and Halstead tokens
    fn visit_facts(&mut self, root: Node) {
        walk_preorder(root, |node, _| {
            match node.kind() {
                "import_statement" => self.plain_import(node),
                "import_from_statement" | "future_import_statement" => self.from_import(node),
                "assignment" => self.assignment(node),
                "comment" => {
                    self.comment_rows.insert(node.start_position().row);
                }
                kind if OPERATOR_KINDS.contains(&kind) => self.halstead(node),
                _ => {}
            }
            true
        });
    }

    fn plain_import(&mut self, node: Node) {
        let line = node.start_position().row + 1;
        let mut cursor = node.walk();
        let names: Vec<Node> = node.children_by_field_name("name", &mut cursor).collect();
        for name in names {
            let (module, alias) = match name.kind() {
                "aliased_import" => (
                    self.field_text(name, "name").unwrap_or_default(),
                    self.field_text(name, "alias"),
                ),
                _ => (self.text(name).to_string(), None),
            };
            self.table.imports.push(ImportStatement {
                module: strip_whitespace(&module),
                names: Vec::new(),
                alias,
                is_from_import: false,
                line,
            });
        }
    }

    fn from_import(&mut self, node: Node) {
        let module = if node.kind() == "future_import_statement" {
            "__future__".to_string()
        } else {
            match node.child_by_field_name("module_name") {
                Some(module) => strip_whitespace(self.text(module)),
                None => return,
            }
        };

        let mut cursor = node.walk();
        let mut names: Vec<String> = node
            .children_by_field_name("name", &mut cursor)
            .map(|name| match name.kind() {
                "aliased_import" => self.field_text(name, "name").unwrap_or_default(),
                _ => self.text(name).to_string(),
            })
            .collect();
        if named_children(node).iter().any(|child| child.kind() == "wildcard_import") {
            names.push("*".to_string());
        }

        self.table.imports.push(ImportStatement {
            module,
            names,
            alias: None,
            is_from_import: true,
            line: node.start_position().row + 1,
        });
    }

    fn assignment(&mut self, node: Node) {
        let targets = node
            .child_by_field_name("left")
            .filter(|left| left.kind() == "identifier")
            .map(|left| vec![self.text(left).to_string()])
            .unwrap_or_default();
        let value_callee = node
            .child_by_field_name("right")
            .filter(|right| right.kind() == "call")
            .and_then(|call| self.field_text(call, "function"));

        if targets.is_empty() && value_callee.is_none() {
            return;
        }
        self.table.assignments.push(Assignment {
            targets,
            value_callee,
            line: node.start_position().row + 1,
        });
    }

    /// Tokens of one operator node. Operands are leaf names and literals;
    /// nested expressions are counted when the walk reaches them.
    fn halstead(&mut self, node: Node) {
        for child in children(node) {
            if child.kind() == "comment" {
                continue;
            }
            let token = self.text(child).to_string();
            if !child.is_named() {
                self.table.halstead.total_operators += 1;
                self.operators.insert(token);
            } else if child.child_count() == 0 || matches!(child.kind(), "string" | "concatenated_string") {
                self.table.halstead.total_operands += 1;
                self.operands.insert(token);
            }
        }
    }

    fn finish(mut self, root: Node, source: &str) -> SymbolTable {
        self.table.module_branch_points = count_branches(root);
        self.table.halstead = HalsteadCounts {
            distinct_operators: self.operators.len(),
            distinct_operands: self.operands.len(),
            ..self.table.halstead
        };

        let mut raw = RawMetrics::default();
        let mut comment_only = 0;
        for line in source.lines() {
            raw.loc += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                raw.blank += 1;
            } else if trimmed.starts_with('#') {
                comment_only += 1;
            }
        }
        raw.comments = self.comment_rows.len();
        raw.sloc = raw.loc - raw.blank - comment_only;
        self.table.raw = raw;
        self.table
    }
}

fn children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Push `items` so that they pop in their original order
fn push_in_order<T>(stack: &mut Vec<T>, items: impl IntoIterator<Item = T>) {
    let mark = stack.len();
    stack.extend(items);
    stack[mark..].reverse();
}

/// Named fields of `node` in the given order, all in read context
fn fields<'t>(node: Node<'t>, names: &[&str]) -> Vec<(Node<'t>, bool)> {
    names
        .iter()
        .filter_map(|name| node.child_by_field_name(*name))
        .map(|child| (child, false))
        .collect()
}

/// Every child of `node`, with `store` flagged as an assignment target
fn marked_children<'t>(node: Node<'t>, store: Option<Node<'t>>) -> Vec<(Node<'t>, bool)> {
    children(node)
        .into_iter()
        .map(|child| (child, store.is_some_and(|target| target.id() == child.id())))
        .collect()
}

/// Pre-order walk on a single cursor, so tree depth never reaches the call
/// stack. `visit` gets each node with its depth below `node` and returns
/// whether to descend into it.
fn walk_preorder<'t>(node: Node<'t>, mut visit: impl FnMut(Node<'t>, usize) -> bool) {
    let mut cursor = node.walk();
    let mut depth = 0;
    loop {
        if visit(cursor.node(), depth) && cursor.goto_first_child() {
            depth += 1;
            continue;
        }
        loop {
            if depth == 0 {
                return;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            cursor.goto_parent();
            depth -= 1;
        }
    }
}

/// Decision points below `node`, not descending into nested definitions
fn count_branches(node: Node) -> usize {
    let mut count = 0;
    walk_preorder(node, |child, depth| {
        if depth == 0 {
            return true;
        }
        if matches!(child.kind(), "function_definition" | "class_definition") {
            return false;
        }
        count += usize::from(DECISION_KINDS.contains(&child.kind()));
        true
    });
    count
}

/// Line of the first node nested more than `limit` levels below `root`
fn first_line_deeper_than(root: Node, limit: usize) -> Option<usize> {
    let mut line = None;
    walk_preorder(root, |node, depth| {
        if line.is_some() {
            return false;
        }
        if depth > limit {
            line = Some(node.start_position().row + 1);
            return false;
        }
        true
    });
    line
}

/// `return obj.attr(...)`
fn is_attribute_delegation(statement: Node) -> bool {
    if statement.kind() != "return_statement" {
        return false;
    }
    named_children(statement)
        .into_iter()
        .find(|child| child.kind() != "comment")
        .filter(|value| value.kind() == "call")
        .and_then(|call| call.child_by_field_name("function"))
        .is_some_and(|function| function.kind() == "attribute")
}

fn first_error_line(root: Node) -> Option<usize> {
    let mut line = None;
    walk_preorder(root, |node, _| {
        if line.is_some() {
            return false;
        }
        if node.is_error() || node.is_missing() {
            line = Some(node.start_position().row + 1);
            return false;
        }
        node.has_error()
    });
    line
}

/// Strip string prefixes and quotes from a docstring literal
fn normalize_docstring(literal: &str) -> Option<String> {
    let unprefixed = literal.trim_start_matches(|c: char| "rRuUbBfF".contains(c));
    let body = ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find_map(|quote| {
            unprefixed
                .strip_prefix(quote)
                .map(|rest| rest.strip_suffix(quote).unwrap_or(rest))
        })
        .unwrap_or(unprefixed)
        .trim();
    (!body.is_empty()).then(|| body.to_string())
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<SymbolTable> {
        PythonParser::new().parse(Path::new("sample.py"), source)
    }

    const SAMPLE: &str = r#""""Module doc."""
import os
import numpy as np
from . import sibling
from ..pkg.mod import a, b as c
from collections import *


def helper(x):
    if x > 0 and x < 10:
        return x
    return [y for y in range(x) if y]


class Service(Base):
    """Service docs."""

    @functools.lru_cache(maxsize=None)
    def fetch(self):
        return self.client.fetch()
"#;

    #[test]
    fn test_definitions() -> Result<()> {
        let table = parse(SAMPLE)?;
        assert_eq!(table.module_docstring.as_deref(), Some("Module doc."));
        assert_eq!(table.functions.len(), 2);

        let helper = &table.functions[0];
        assert_eq!(helper.name, "helper");
        assert_eq!(helper.line, 9);
        assert_eq!(helper.docstring, None);
        assert_eq!(helper.branch_points, 4);
        assert_eq!(helper.cyclomatic_complexity(), 5);
        assert_eq!(helper.class_name, None);

        let fetch = &table.functions[1];
        assert_eq!(fetch.decorators, vec!["functools.lru_cache"]);
        assert_eq!(fetch.statement_count, 1);
        assert!(fetch.delegates_to_attribute);
        assert_eq!(fetch.class_name.as_deref(), Some("Service"));

        assert_eq!(table.classes.len(), 1);
        let service = &table.classes[0];
        assert_eq!(service.bases, vec!["Base"]);
        assert_eq!(service.docstring.as_deref(), Some("Service docs."));
        assert_eq!(service.methods.len(), 1);
        Ok(())
    }

    #[test]
    fn test_imports() -> Result<()> {
        let table = parse(SAMPLE)?;
        let modules: Vec<&str> = table.imports.iter().map(|i| i.module.as_str()).collect();
        assert_eq!(modules, vec!["os", "numpy", ".", "..pkg.mod", "collections"]);
        assert_eq!(table.imports[1].alias.as_deref(), Some("np"));
        assert_eq!(table.imports[2].names, vec!["sibling"]);
        assert_eq!(table.imports[3].names, vec!["a", "b"]);
        assert_eq!(table.imports[4].names, vec!["*"]);
        assert!(table.imports[3].is_from_import);
        assert!(!table.imports[0].is_from_import);
        Ok(())
    }

    #[test]
    fn test_usage() -> Result<()> {
        let table = parse(
            "def unused():\n    pass\n\ndef used(a, b=1):\n    total = a + b\n    return total\n\nresult = used(1, b=2)\nprint(result)\nobj.method()\n",
        )?;
        assert_eq!(table.calls, vec!["used", "print", "method"]);
        let reads = |name: &str| table.references.iter().filter(|r| r.as_str() == name).count();
        assert_eq!(reads("unused"), 0);
        assert_eq!(reads("method"), 0);
        assert_eq!(reads("b"), 1);
        assert_eq!(reads("total"), 1);
        assert_eq!(reads("result"), 1);
        assert_eq!(reads("used"), 1);
        assert_eq!(reads("obj"), 1);

        assert_eq!(table.assignments.len(), 2);
        assert_eq!(table.assignments[1].targets, vec!["result"]);
        assert_eq!(table.assignments[1].value_callee.as_deref(), Some("used"));
        Ok(())
    }

    #[test]
    fn test_nested_definitions_are_excluded_from_branches() -> Result<()> {
        let table = parse(
            "def outer(x):\n    if x:\n        pass\n    def inner(y):\n        while y:\n            y -= 1\n    return inner\n",
        )?;
        assert_eq!(table.functions[0].branch_points, 1);
        assert_eq!(table.functions[1].name, "inner");
        assert_eq!(table.functions[1].branch_points, 1);
        assert_eq!(table.module_branch_points, 0);
        assert_eq!(table.total_complexity(), 4);
        Ok(())
    }

    #[test]
    fn test_raw_metrics() -> Result<()> {
        let table = parse("# header comment\n\nx = 1  # trailing\n# only comment\n")?;
        assert_eq!(
            table.raw,
            RawMetrics { loc: 4, sloc: 1, comments: 3, blank: 1 }
        );
        Ok(())
    }

    #[test]
    fn test_halstead_counts() -> Result<()> {
        let table = parse("x = a + b * c\n")?;
        assert_eq!(table.halstead.total_operators, 2);
        assert_eq!(table.halstead.distinct_operators, 2);
        assert_eq!(table.halstead.total_operands, 3);
        assert_eq!(table.halstead.distinct_operands, 3);
        assert!(table.halstead.volume() > 0.0);

        let table = parse("y = not (a == 'x')\n")?;
        assert_eq!(table.halstead.total_operators, 2);
        assert_eq!(table.halstead.total_operands, 2);
        Ok(())
    }

    #[test]
    fn test_each_decision_kind_adds_one() -> Result<()> {
        const PLAIN: &str = "def f(x):\n    return x\n";
        const BRANCH: &str = "def f(x):\n    if x:\n        x = 1\n    return x\n";
        const COMPREHENSION: &str = "def f(x):\n    return [y for y in x]\n";
        const GUARDED: &str = "def f(x):\n    try:\n        return x\n    finally:\n        pass\n";
        const MATCHED: &str =
            "def f(x):\n    match x:\n        case 1:\n            return 1\n    return x\n";

        let cases = [
            ("if_statement", PLAIN, BRANCH),
            (
                "elif_clause",
                BRANCH,
                "def f(x):\n    if x:\n        x = 1\n    elif x:\n        x = 2\n    return x\n",
            ),
            ("conditional_expression", PLAIN, "def f(x):\n    return x if x else 0\n"),
            ("for_statement", PLAIN, "def f(x):\n    for y in x:\n        pass\n    return x\n"),
            ("while_statement", PLAIN, "def f(x):\n    while x:\n        x -= 1\n    return x\n"),
            ("for_in_clause", PLAIN, COMPREHENSION),
            ("if_clause", COMPREHENSION, "def f(x):\n    return [y for y in x if y]\n"),
            (
                "except_clause",
                GUARDED,
                "def f(x):\n    try:\n        return x\n    except ValueError:\n        return 0\n    finally:\n        pass\n",
            ),
            (
                "except_group_clause",
                GUARDED,
                "def f(x):\n    try:\n        return x\n    except* ValueError:\n        return 0\n    finally:\n        pass\n",
            ),
            ("boolean_operator", PLAIN, "def f(x):\n    return x and x\n"),
            ("boolean_operator", "def f(x):\n    return x and x\n", "def f(x):\n    return x and x or x\n"),
            (
                "case_clause",
                MATCHED,
                "def f(x):\n    match x:\n        case 1:\n            return 1\n        case 2:\n            return 2\n    return x\n",
            ),
        ];

        for kind in DECISION_KINDS {
            assert!(cases.iter().any(|(covered, _, _)| covered == kind), "{kind} not covered");
        }
        for (kind, before, after) in cases {
            let before = parse(before)?;
            let after = parse(after)?;
            assert_eq!(
                after.functions[0].cyclomatic_complexity(),
                before.functions[0].cyclomatic_complexity() + 1,
                "adding one {kind}"
            );
            assert_eq!(after.total_complexity(), before.total_complexity() + 1, "adding one {kind}");
        }
        Ok(())
    }

    #[test]
    fn test_deep_nesting_is_a_parse_error() {
        let source = format!("x = {}\n", vec!["1"; 50_000].join("+"));
        let result = parse(&source);
        assert!(matches!(result, Err(Error::Parse(message)) if message.contains("nesting")));
    }

    #[test]
    fn test_walks_do_not_recurse_on_depth() -> Result<()> {
        let source = format!("x = {}\n", vec!["a"; 50_000].join(" or "));
        let mut parser = Parser::new();
        parser
            .set_language(tree_sitter_python::language())
            .map_err(|e| Error::Parse(e.to_string()))?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| Error::Parse("no tree".to_string()))?;
        let root = tree.root_node();

        assert!(first_line_deeper_than(root, MAX_NESTING_DEPTH).is_some());
        assert_eq!(first_error_line(root), None);
        assert_eq!(count_branches(root), 49_999);

        let mut collector = SymbolCollector::new(source.as_bytes());
        collector.visit_definitions(root);
        collector.visit_usage(root);
        collector.visit_facts(root);
        let table = collector.finish(root, &source);
        assert_eq!(table.references.len(), 50_000);
        assert_eq!(table.halstead.total_operators, 49_999);
        assert_eq!(table.module_branch_points, 49_999);
        Ok(())
    }

    #[test]
    fn test_nesting_within_limit_parses() -> Result<()> {
        let source = format!("x = {}\n", vec!["1"; 200].join("+"));
        let table = parse(&source)?;
        assert_eq!(table.halstead.total_operators, 199);
        assert_eq!(table.halstead.total_operands, 200);
        Ok(())
    }

    #[test]
    fn test_syntax_error() {
        let result = parse("def broken(:\n    pass\n");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_docstring_normalization() {
        assert_eq!(normalize_docstring(r#""""  Text. """"#).as_deref(), Some("Text."));
        assert_eq!(normalize_docstring("r'''raw'''").as_deref(), Some("raw"));
        assert_eq!(normalize_docstring("\"\"").as_deref(), None);
    }

    #[test]
    fn test_standard_modules() {
        assert!(is_standard_module("os"));
        assert!(is_standard_module("__future__"));
        assert!(!is_standard_module("numpy"));
    }
}
