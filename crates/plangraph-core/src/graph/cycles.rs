//! Cycle detection for the plan dependency graph.
//!
//! # Overview
//!
//! Dependencies must form a DAG: a cycle leaves every step on it waiting
//! for another. [`PlanGraph::detect_cycle`] reports the first cycle found
//! as an ordered path whose last element repeats the first.
//!
//! # Design
//!
//! - **Three-color DFS**: `visited` holds fully processed nodes and
//!   `on_stack` holds nodes on the current DFS path. Reaching a node that
//!   is on the stack closes a cycle.
//! - **Explicit stack**: the traversal keeps its own frame stack instead of
//!   recursing, so long prerequisite chains cannot overflow the call stack.
//! - **Every node is a root**: cycles in components unreachable from the
//!   first node are still found.
//! - **Deterministic**: roots are tried in node order and neighbors in edge
//!   insertion order, so the same graph always reports the same path.
//! - **O(V+E)**: each node and edge is visited at most once.
//!
//! All edges participate, hard and soft alike.

#![allow(clippy::module_name_repetitions)]

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::{PlanEdge, PlanGraph, PlanNode};

// ---------------------------------------------------------------------------
// CyclePath
// ---------------------------------------------------------------------------

/// An ordered cycle of node ids, closed by repeating the first id.
///
/// For example, the loop A → B → C → A is `["A", "B", "C", "A"]` and a
/// self-loop on X is `["X", "X"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CyclePath(Vec<String>);

impl CyclePath {
    pub const fn new(path: Vec<String>) -> Self {
        Self(path)
    }

    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn into_ids(self) -> Vec<String> {
        self.0
    }

    /// Number of distinct nodes on the cycle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.len() == 1
    }

    /// Two steps that each require the other.
    #[must_use]
    pub fn is_mutual(&self) -> bool {
        self.len() == 2
    }

    #[must_use]
    pub fn contains(&self, node_id: &str) -> bool {
        self.0.iter().any(|id| id == node_id)
    }
}

impl fmt::Display for CyclePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_self_loop() {
            write!(f, "self-loop on '{}'", self.0[0])
        } else if self.is_mutual() {
            write!(
                f,
                "mutual dependency between '{}' and '{}'",
                self.0[0], self.0[1]
            )
        } else {
            write!(f, "{} steps: {}", self.len(), self.0.join(" → "))
        }
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

impl PlanGraph {
    /// Return the first dependency cycle found, or `None` for a DAG.
    #[must_use]
    pub fn detect_cycle(&self) -> Option<CyclePath> {
        find_cycle(&self.nodes, &self.edges)
    }

    /// Return `true` if the graph contains any dependency cycle.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        self.detect_cycle().is_some()
    }
}

/// Cycle search over borrowed parts, so callers can probe a scratch edge
/// list without cloning the node set.
pub(crate) fn find_cycle(nodes: &[PlanNode], edges: &[PlanEdge]) -> Option<CyclePath> {
    let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        outgoing
            .entry(edge.from_node_id.as_str())
            .or_default()
            .push(edge.to_node_id.as_str());
    }

    let mut visited: HashSet<&str> = HashSet::with_capacity(nodes.len());
    let mut on_stack: HashSet<&str> = HashSet::new();

    for root in nodes.iter().map(|node| node.id.as_str()) {
        if visited.contains(root) {
            continue;
        }

        // Each frame is (node, index of the next outgoing edge to try).
        // The frame stack doubles as the current DFS path.
        let mut frames: Vec<(&str, usize)> = vec![(root, 0)];
        on_stack.insert(root);

        while let Some(&(current, cursor)) = frames.last() {
            let next = outgoing
                .get(current)
                .and_then(|targets| targets.get(cursor))
                .copied();

            let Some(neighbor) = next else {
                frames.pop();
                on_stack.remove(current);
                visited.insert(current);
                continue;
            };

            if let Some(top) = frames.last_mut() {
                top.1 += 1;
            }

            if on_stack.contains(neighbor) {
                let start = frames
                    .iter()
                    .position(|(id, _)| *id == neighbor)
                    .unwrap_or(0);
                let mut path: Vec<String> =
                    frames[start..].iter().map(|(id, _)| (*id).to_string()).collect();
                path.push(neighbor.to_string());
                trace!(root, ?path, "dependency cycle found");
                return Some(CyclePath::new(path));
            }

            if !visited.contains(neighbor) {
                on_stack.insert(neighbor);
                frames.push((neighbor, 0));
            }
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
