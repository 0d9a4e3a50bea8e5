//! Cycle detection over the import graph
//!
//! Depth-first search driven by an explicit frame stack. A back-edge to a
//! node on the current path yields the path slice starting at that node.
//! Cycles are rotated so the smallest path leads, then deduplicated.

use super::DependencyGraph;
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, HashSet};

struct Frame {
    node: NodeIndex,
    successors: Vec<NodeIndex>,
    next: usize,
}

pub fn find_cycles(graph: &DependencyGraph) -> Vec<Vec<String>> {
    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut cycles = Vec::new();

    for (_, start) in graph.sorted_nodes() {
        if !visited.insert(start) {
            continue;
        }

        let mut path: Vec<NodeIndex> = vec![start];
        let mut on_path: HashMap<NodeIndex, usize> = HashMap::from([(start, 0)]);
        let mut stack = vec![Frame {
            node: start,
            successors: graph.sorted_successors(start),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.next >= frame.successors.len() {
                on_path.remove(&frame.node);
                path.pop();
                stack.pop();
                continue;
            }
            let successor = frame.successors[frame.next];
            frame.next += 1;

            if let Some(&position) = on_path.get(&successor) {
                let cycle = canonicalize(
                    path[position..]
                        .iter()
                        .map(|&index| graph.path(index).to_string())
                        .collect(),
                );
                if seen.insert(cycle.clone()) {
                    cycles.push(cycle);
                }
            } else if visited.insert(successor) {
                on_path.insert(successor, path.len());
                path.push(successor);
                stack.push(Frame {
                    node: successor,
                    successors: graph.sorted_successors(successor),
                    next: 0,
                });
            }
        }
    }

    tracing::debug!(cycles = cycles.len(), "cycle detection complete");
    cycles
}

/// Rotate so the lexicographically smallest entry comes first
fn canonicalize(mut cycle: Vec<String>) -> Vec<String> {
    if let Some(smallest) = cycle
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(position, _)| position)
    {
        cycle.rotate_left(smallest);
    }
    cycle
}
