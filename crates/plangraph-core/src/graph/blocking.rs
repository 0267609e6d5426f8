//! Prerequisite/dependent lookups and blocked/ready node sets.
//!
//! # Scheduling Semantics
//!
//! A node is **blocked** if at least one of its prerequisites is not yet
//! completed. Soft edges count the same as hard ones here. Prerequisites
//! that reference ids missing from the node set are ignored.
//!
//! A node is **available** if it is unblocked and not itself completed:
//! the "what can I work on next" list.
//!
//! # Usage
//!
//! ```rust,ignore
//! if graph.is_node_blocked("draft") {
//!     for p in graph.get_prerequisites("draft") {
//!         println!("waiting on {}", p.title);
//!     }
//! }
//! let next = graph.get_available_nodes();
//! ```
//!
//! Lookups scan the edge list; adjacency is not cached between calls.

#![allow(clippy::must_use_candidate)]

use std::collections::HashSet;

use crate::model::{PlanGraph, PlanNode};

impl PlanGraph {
    /// Nodes that must be done before `node_id`, in edge insertion order.
    pub fn get_prerequisites(&self, node_id: &str) -> Vec<&PlanNode> {
        self.edges
            .iter()
            .filter(|edge| edge.to_node_id == node_id)
            .filter_map(|edge| self.get_node(&edge.from_node_id))
            .collect()
    }

    /// Nodes that wait on `node_id`, in edge insertion order.
    pub fn get_dependents(&self, node_id: &str) -> Vec<&PlanNode> {
        self.edges
            .iter()
            .filter(|edge| edge.from_node_id == node_id)
            .filter_map(|edge| self.get_node(&edge.to_node_id))
            .collect()
    }

    /// Return `true` if any prerequisite of `node_id` is incomplete.
    ///
    /// Unknown ids are never blocked.
    pub fn is_node_blocked(&self, node_id: &str) -> bool {
        self.get_prerequisites(node_id)
            .iter()
            .any(|prereq| !prereq.is_completed)
    }

    /// All nodes with no incomplete prerequisite, completed ones included.
    pub fn get_unblocked_nodes(&self) -> Vec<&PlanNode> {
        self.nodes
            .iter()
            .filter(|node| !self.is_node_blocked(&node.id))
            .collect()
    }

    /// All nodes with at least one incomplete prerequisite.
    pub fn get_blocked_nodes(&self) -> Vec<&PlanNode> {
        self.nodes
            .iter()
            .filter(|node| self.is_node_blocked(&node.id))
            .collect()
    }

    /// Incomplete nodes whose prerequisites are all done.
    ///
    /// Ordered topologically when the graph is acyclic, otherwise in node
    /// order.
    pub fn get_available_nodes(&self) -> Vec<&PlanNode> {
        let is_available = |node: &&PlanNode| !node.is_completed && !self.is_node_blocked(&node.id);
        match self.topological_sort() {
            Some(order) => order.into_iter().filter(is_available).collect(),
            None => self.nodes.iter().filter(is_available).collect(),
        }
    }

    /// Nodes that no edge points to.
    pub fn get_root_nodes(&self) -> Vec<&PlanNode> {
        let targets: HashSet<&str> = self
            .edges
            .iter()
            .map(|edge| edge.to_node_id.as_str())
            .collect();
        self.nodes
            .iter()
            .filter(|node| !targets.contains(node.id.as_str()))
            .collect()
    }

    /// Nodes that no edge leaves.
    pub fn get_leaf_nodes(&self) -> Vec<&PlanNode> {
        let sources: HashSet<&str> = self
            .edges
            .iter()
            .map(|edge| edge.from_node_id.as_str())
            .collect();
        self.nodes
            .iter()
            .filter(|node| !sources.contains(node.id.as_str()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
