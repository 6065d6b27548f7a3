//! Module evaluation ordering
//!
//! Computes the order in which modules should be processed: the app
//! module first (every other module's evaluation depends on it), then
//! dependencies before their dependents. The order is deterministic,
//! keeping declaration order wherever the graph leaves a choice.

use crate::project::AndroidProject;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use trellis_core::error::{Error, Result};

/// Evaluation order over the project's modules, as settings paths
///
/// Edges run from a module to the modules that must wait for it: the
/// app module precedes every other module, and a `project(":x")`
/// dependency precedes its dependent. Dependencies declared by the app
/// module itself are subsumed by the app-first rule and add no edges.
/// A dependency cycle among the remaining modules is an error.
pub fn evaluation_order(project: &AndroidProject, app_module: &str) -> Result<Vec<String>> {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut nodes: Vec<(String, NodeIndex)> = Vec::new();

    for module in &project.modules {
        let index = graph.add_node(module.path.clone());
        nodes.push((module.path.clone(), index));
    }
    let lookup = |path: &str| {
        nodes
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, index)| *index)
    };

    let app = lookup(app_module);
    for module in &project.modules {
        let Some(to) = lookup(&module.path) else {
            continue;
        };
        if Some(to) != app {
            if let Some(from) = app {
                graph.add_edge(from, to, ());
            }
            for dep in module.project_dependencies() {
                // unknown targets are ignored, matching best-effort discovery
                if let Some(from) = lookup(&dep) {
                    if from != to {
                        graph.add_edge(from, to, ());
                    }
                }
            }
        }
    }

    stable_topological_order(&graph)
}

/// Kahn's algorithm, always taking the lowest-index ready node
///
/// Node indices follow declaration order, so unconstrained modules come
/// out in the order the settings file declared them.
fn stable_topological_order(graph: &DiGraph<String, ()>) -> Result<Vec<String>> {
    let mut indegree: Vec<usize> = graph
        .node_indices()
        .map(|index| {
            graph
                .neighbors_directed(index, Direction::Incoming)
                .count()
        })
        .collect();
    let mut placed = vec![false; graph.node_count()];
    let mut order = Vec::with_capacity(graph.node_count());

    while order.len() < graph.node_count() {
        let next = graph
            .node_indices()
            .find(|index| !placed[index.index()] && indegree[index.index()] == 0);
        let Some(index) = next else {
            let stuck: Vec<&str> = graph
                .node_indices()
                .filter(|index| !placed[index.index()])
                .map(|index| graph[index].as_str())
                .collect();
            return Err(Error::evaluation_cycle(stuck.join(" -> ")));
        };
        placed[index.index()] = true;
        order.push(graph[index].clone());
        for neighbor in graph.neighbors_directed(index, Direction::Outgoing) {
            indegree[neighbor.index()] -= 1;
        }
    }

    Ok(order)
}
