//! Batch structural diagnostics.
//!
//! [`PlanGraph::validate`] runs every invariant check independently and
//! returns all violations, so one malformed graph can report several.
//! It never mutates and is safe on any snapshot, including externally
//! loaded documents and speculative scratch copies.

use std::collections::HashSet;

use tracing::debug;

use crate::error::GraphError;
use crate::model::PlanGraph;

impl PlanGraph {
    /// Audit the graph against all structural invariants.
    ///
    /// Violations are reported in check order: duplicate node ids, orphan
    /// edges, self-loops, duplicate edges, and finally a cycle if one
    /// exists.
    #[must_use]
    pub fn validate(&self) -> Vec<GraphError> {
        let mut errors = Vec::new();

        check_duplicate_nodes(self, &mut errors);
        check_orphan_edges(self, &mut errors);
        check_self_loops(self, &mut errors);
        check_duplicate_edges(self, &mut errors);

        if let Some(path) = self.detect_cycle() {
            errors.push(GraphError::CycleDetected { path });
        }

        if !errors.is_empty() {
            debug!(graph = %self.id, violations = errors.len(), "graph failed validation");
        }
        errors
    }

    /// `true` iff [`PlanGraph::validate`] reports nothing.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

fn check_duplicate_nodes(graph: &PlanGraph, errors: &mut Vec<GraphError>) {
    let mut seen: HashSet<&str> = HashSet::with_capacity(graph.nodes.len());
    let mut reported: HashSet<&str> = HashSet::new();
    for node in &graph.nodes {
        let id = node.id.as_str();
        if !seen.insert(id) && reported.insert(id) {
            errors.push(GraphError::DuplicateNodeId { id: id.to_string() });
        }
    }
}

fn check_orphan_edges(graph: &PlanGraph, errors: &mut Vec<GraphError>) {
    let ids: HashSet<&str> = graph.nodes.iter().map(|node| node.id.as_str()).collect();
    for edge in &graph.edges {
        if !ids.contains(edge.from_node_id.as_str()) || !ids.contains(edge.to_node_id.as_str()) {
            errors.push(GraphError::OrphanEdge { edge: edge.clone() });
        }
    }
}

fn check_self_loops(graph: &PlanGraph, errors: &mut Vec<GraphError>) {
    for edge in &graph.edges {
        if edge.from_node_id == edge.to_node_id {
            errors.push(GraphError::SelfLoop {
                id: edge.from_node_id.clone(),
            });
        }
    }
}

fn check_duplicate_edges(graph: &PlanGraph, errors: &mut Vec<GraphError>) {
    let mut seen: HashSet<(&str, &str)> = HashSet::with_capacity(graph.edges.len());
    for edge in &graph.edges {
        if !seen.insert((edge.from_node_id.as_str(), edge.to_node_id.as_str())) {
            errors.push(GraphError::DuplicateEdge { edge: edge.clone() });
        }
    }
}
