//! Aggregate statistics and critical-path analysis.
//!
//! # Statistics Provided
//!
//! - **total_nodes / completed_nodes / blocked_nodes**: node counts.
//! - **total_edges**: dependency count, hard and soft.
//! - **root_node_count / leaf_node_count**: nodes without incoming /
//!   outgoing edges.
//! - **isolated_node_count**: nodes with neither.
//! - **longest_path**: critical-path length in edge hops. A chain
//!   `A → B → C` has length 2; a graph without edges has length 0.
//! - **estimated_total_duration / remaining_duration**: summed estimates
//!   over all nodes / incomplete nodes, in seconds.
//! - **completion_percentage**: `completed / total * 100`, 0 for an empty
//!   graph.
//! - **density**: `edges / (nodes * (nodes - 1))`, 0 below two nodes.
//!
//! # Critical path
//!
//! Distances are relaxed in topological order: every node starts at 0 and
//! each edge `u → v` raises `dist[v]` to `dist[u] + 1`. The maximum
//! distance is the longest path. A cyclic graph has no topological order
//! and reports 0 and an empty path.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{PlanGraph, PlanNode};

// ---------------------------------------------------------------------------
// GraphStatistics
// ---------------------------------------------------------------------------

/// Summary statistics for a plan graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStatistics {
    pub total_nodes: usize,
    pub completed_nodes: usize,
    pub blocked_nodes: usize,
    pub total_edges: usize,
    pub root_node_count: usize,
    pub leaf_node_count: usize,
    pub isolated_node_count: usize,
    /// Critical-path length in edge hops.
    pub longest_path: usize,
    /// Sum of `estimated_duration` over all nodes, in seconds.
    pub estimated_total_duration: u64,
    /// Sum of `estimated_duration` over incomplete nodes, in seconds.
    pub remaining_duration: u64,
    /// In `[0.0, 100.0]`.
    pub completion_percentage: f64,
    /// In `[0.0, 1.0]` for graphs without duplicate edges.
    pub density: f64,
}

impl GraphStatistics {
    /// Return `true` if every node is completed (vacuously true when empty).
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completed_nodes == self.total_nodes
    }

    /// Return `true` if the graph has no dependencies at all.
    #[must_use]
    pub const fn is_flat(&self) -> bool {
        self.total_edges == 0
    }
}

/// Forward-pass result: per-node distance and the predecessor that set it.
struct Relaxation<'a> {
    order: Vec<&'a PlanNode>,
    distance: HashMap<&'a str, usize>,
    predecessor: HashMap<&'a str, &'a str>,
}

impl PlanGraph {
    /// Compute [`GraphStatistics`] for the current state.
    #[must_use]
    pub fn get_statistics(&self) -> GraphStatistics {
        let total_nodes = self.nodes.len();
        let completed_nodes = self.nodes.iter().filter(|n| n.is_completed).count();
        let roots = self.get_root_nodes();
        let leaves = self.get_leaf_nodes();
        let isolated_node_count = roots
            .iter()
            .filter(|root| leaves.iter().any(|leaf| leaf.id == root.id))
            .count();

        // Durations saturate rather than overflow.
        let estimated_total_duration = self
            .nodes
            .iter()
            .map(|n| n.estimated_duration)
            .fold(0u64, u64::saturating_add);
        let remaining_duration = self
            .nodes
            .iter()
            .filter(|n| !n.is_completed)
            .map(|n| n.estimated_duration)
            .fold(0u64, u64::saturating_add);

        GraphStatistics {
            total_nodes,
            completed_nodes,
            blocked_nodes: self.get_blocked_nodes().len(),
            total_edges: self.edges.len(),
            root_node_count: roots.len(),
            leaf_node_count: leaves.len(),
            isolated_node_count,
            longest_path: self.longest_path(),
            estimated_total_duration,
            remaining_duration,
            completion_percentage: compute_percentage(completed_nodes, total_nodes),
            density: compute_density(total_nodes, self.edges.len()),
        }
    }

    /// Critical-path length in edge hops; 0 if the graph is empty or cyclic.
    #[must_use]
    pub fn longest_path(&self) -> usize {
        self.relax()
            .and_then(|r| r.distance.values().copied().max())
            .unwrap_or(0)
    }

    /// One longest dependency chain, prerequisites first.
    ///
    /// Among equally long chains, the one ending at the earliest node in
    /// topological order wins, and each step back prefers the predecessor
    /// that was ordered first. Empty if the graph is empty or cyclic.
    #[must_use]
    pub fn critical_path(&self) -> Vec<&PlanNode> {
        let Some(relaxation) = self.relax() else {
            return Vec::new();
        };

        let mut best: Option<(&PlanNode, usize)> = None;
        for &node in &relaxation.order {
            let dist = relaxation.distance[node.id.as_str()];
            if best.is_none_or(|(_, d)| dist > d) {
                best = Some((node, dist));
            }
        }
        let Some((end, _)) = best else {
            return Vec::new();
        };

        let mut path = vec![end];
        let mut cursor = end.id.as_str();
        while let Some(&prev) = relaxation.predecessor.get(cursor) {
            if let Some(node) = self.get_node(prev) {
                path.push(node);
            }
            cursor = prev;
        }
        path.reverse();
        path
    }

    fn relax(&self) -> Option<Relaxation<'_>> {
        let order = self.topological_sort()?;

        let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &self.edges {
            outgoing
                .entry(edge.from_node_id.as_str())
                .or_default()
                .push(edge.to_node_id.as_str());
        }

        let mut distance: HashMap<&str, usize> =
            order.iter().map(|node| (node.id.as_str(), 0)).collect();
        let mut predecessor: HashMap<&str, &str> = HashMap::new();

        for node in &order {
            let source = node.id.as_str();
            let base = distance.get(source).copied().unwrap_or(0);
            for &target in outgoing.get(source).into_iter().flatten() {
                if let Some(current) = distance.get_mut(target) {
                    if base + 1 > *current {
                        *current = base + 1;
                        predecessor.insert(target, source);
                    }
                }
            }
        }

        Some(Relaxation {
            order,
            distance,
            predecessor,
        })
    }
}

// ---------------------------------------------------------------------------
// Internal helpers (cast precision suppressed at function scope)
// ---------------------------------------------------------------------------

#[allow(clippy::cast_precision_loss)]
fn compute_percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0_f64;
    }
    completed as f64 / total as f64 * 100.0
}

#[allow(clippy::cast_precision_loss)]
fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0_f64;
    }
    let max_edges = (node_count * (node_count - 1)) as f64;
    edge_count as f64 / max_edges
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
