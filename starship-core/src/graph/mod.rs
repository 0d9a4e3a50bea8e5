//! Internal import graph
//!
//! Nodes are source files, edges are resolved internal imports. Edges and
//! neighbor lists are kept in sorted order so every traversal is
//! reproducible.

pub mod cycles;

pub use cycles::find_cycles;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One internal file-to-file import
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InternalEdge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    indices: BTreeMap<String, NodeIndex>,
    external: BTreeSet<String>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, path: &str) -> NodeIndex {
        if let Some(&index) = self.indices.get(path) {
            return index;
        }
        let index = self.graph.add_node(path.to_string());
        self.indices.insert(path.to_string(), index);
        index
    }

    /// Adds `from -> to` once; self-imports are ignored
    pub fn add_edge(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }
        let from = self.add_node(from);
        let to = self.add_node(to);
        self.graph.update_edge(from, to, ());
    }

    pub fn add_external(&mut self, package: &str) {
        self.external.insert(package.to_string());
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn external_packages(&self) -> &BTreeSet<String> {
        &self.external
    }

    /// Every edge, sorted by source then target
    pub fn edges(&self) -> Vec<InternalEdge> {
        let mut edges: Vec<InternalEdge> = self
            .graph
            .raw_edges()
            .iter()
            .map(|edge| InternalEdge {
                from: self.graph[edge.source()].clone(),
                to: self.graph[edge.target()].clone(),
            })
            .collect();
        edges.sort();
        edges
    }

    pub fn out_degree(&self, path: &str) -> usize {
        self.indices.get(path).map_or(0, |&index| {
            self.graph.neighbors_directed(index, Direction::Outgoing).count()
        })
    }

    /// Node paths in sorted order
    pub(crate) fn sorted_nodes(&self) -> impl Iterator<Item = (&str, NodeIndex)> + '_ {
        self.indices.iter().map(|(path, &index)| (path.as_str(), index))
    }

    /// Successors of `index` sorted by path
    pub(crate) fn sorted_successors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut successors: Vec<NodeIndex> = self.graph.neighbors(index).collect();
        successors.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        successors.dedup();
        successors
    }

    pub(crate) fn path(&self, index: NodeIndex) -> &str {
        &self.graph[index]
    }

    /// All import cycles, canonicalized and deduplicated
    pub fn cycles(&self) -> Vec<Vec<String>> {
        find_cycles(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_deduplicated_and_sorted() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("b.py", "a.py");
        graph.add_edge("a.py", "c.py");
        graph.add_edge("b.py", "a.py");
        graph.add_edge("a.py", "a.py");
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(
            graph.edges(),
            vec![
                InternalEdge { from: "a.py".into(), to: "c.py".into() },
                InternalEdge { from: "b.py".into(), to: "a.py".into() },
            ]
        );
        assert_eq!(graph.out_degree("a.py"), 1);
        assert_eq!(graph.out_degree("missing.py"), 0);
    }
}
