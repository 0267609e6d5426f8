//! Invariant-preserving mutations.
//!
//! Every fallible mutation either commits a new valid state or returns a
//! single [`GraphError`] with the graph left exactly as it was. Removals
//! and completion toggles never fail; absent ids are ignored.
//!
//! # Edge addition
//!
//! [`PlanGraph::add_edge_with`] runs its checks in a fixed order:
//!
//! 1. `from == to` → [`GraphError::SelfLoop`]
//! 2. either id unknown → [`GraphError::InvalidNodeReference`]
//! 3. pair already present → [`GraphError::DuplicateEdge`]
//! 4. a scratch copy of the edge list plus the candidate is probed for a
//!    cycle → [`GraphError::CycleDetected`]; the scratch list is dropped
//! 5. otherwise the edge is appended to the live graph
//!
//! Only the edge list is copied for the probe; nodes are borrowed.
//!
//! Each successful state change bumps `metadata.version` and refreshes
//! `metadata.modified_at`. Calls that change nothing leave metadata alone.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::cycles::find_cycle;
use crate::error::GraphError;
use crate::model::{EdgeMetadata, PlanEdge, PlanGraph, PlanNode};

impl PlanGraph {
    /// Append a node.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateNodeId`] if a node with the same id exists.
    pub fn add_node(&mut self, node: PlanNode) -> Result<(), GraphError> {
        if self.contains_node(&node.id) {
            debug!(graph = %self.id, node = %node.id, "rejected duplicate node");
            return Err(GraphError::DuplicateNodeId { id: node.id });
        }
        debug!(graph = %self.id, node = %node.id, "node added");
        self.nodes.push(node);
        self.touch();
        Ok(())
    }

    /// Remove a node and every edge that touches it.
    ///
    /// Returns the removed node, or `None` if the id was absent.
    pub fn remove_node(&mut self, node_id: &str) -> Option<PlanNode> {
        let pos = self.node_position(node_id)?;
        let node = self.nodes.remove(pos);
        let before = self.edges.len();
        self.edges.retain(|edge| !edge.touches(node_id));
        debug!(
            graph = %self.id,
            node = node_id,
            edges_removed = before - self.edges.len(),
            "node removed"
        );
        self.touch();
        Some(node)
    }

    /// Add a hard dependency `from → to`.
    ///
    /// # Errors
    ///
    /// See [`PlanGraph::add_edge_with`].
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<(), GraphError> {
        self.add_edge_with(from, to, EdgeMetadata::default())
    }

    /// Add a dependency `from → to` with explicit metadata.
    ///
    /// # Errors
    ///
    /// [`GraphError::SelfLoop`], [`GraphError::InvalidNodeReference`],
    /// [`GraphError::DuplicateEdge`], or [`GraphError::CycleDetected`], in
    /// that order of precedence. The graph is unchanged on error.
    pub fn add_edge_with(
        &mut self,
        from: &str,
        to: &str,
        metadata: EdgeMetadata,
    ) -> Result<(), GraphError> {
        let candidate = PlanEdge::new(from, to).with_metadata(metadata);

        if let Err(err) = self.check_edge(&candidate) {
            debug!(graph = %self.id, from, to, error = %err, "rejected edge");
            return Err(err);
        }

        debug!(graph = %self.id, from, to, kind = %candidate.metadata.kind(), "edge added");
        self.edges.push(candidate);
        self.touch();
        Ok(())
    }

    fn check_edge(&self, candidate: &PlanEdge) -> Result<(), GraphError> {
        let (from, to) = (
            candidate.from_node_id.as_str(),
            candidate.to_node_id.as_str(),
        );

        if from == to {
            return Err(GraphError::SelfLoop { id: from.to_string() });
        }

        for id in [from, to] {
            if !self.contains_node(id) {
                return Err(GraphError::InvalidNodeReference { id: id.to_string() });
            }
        }

        if let Some(existing) = self.get_edge(from, to) {
            return Err(GraphError::DuplicateEdge {
                edge: existing.clone(),
            });
        }

        let mut scratch = self.edges.clone();
        scratch.push(candidate.clone());
        if let Some(path) = find_cycle(&self.nodes, &scratch) {
            return Err(GraphError::CycleDetected { path });
        }

        Ok(())
    }

    /// Remove the edge `from → to` if present.
    ///
    /// Returns `true` if an edge was removed.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|edge| !edge.connects(from, to));
        let removed = self.edges.len() != before;
        if removed {
            debug!(graph = %self.id, from, to, "edge removed");
            self.touch();
        }
        removed
    }

    /// Mark a node completed at `at`. No-op if the id is absent.
    ///
    /// Returns `true` if the node changed.
    pub fn mark_node_completed(&mut self, node_id: &str, at: DateTime<Utc>) -> bool {
        let changed = self
            .nodes
            .iter_mut()
            .find(|node| node.id == node_id)
            .is_some_and(|node| node.mark_completed(at));
        if changed {
            debug!(graph = %self.id, node = node_id, %at, "node completed");
            self.touch();
        }
        changed
    }

    /// Clear a node's completion. No-op if the id is absent.
    ///
    /// Returns `true` if the node changed.
    pub fn mark_node_incomplete(&mut self, node_id: &str) -> bool {
        let changed = self
            .nodes
            .iter_mut()
            .find(|node| node.id == node_id)
            .is_some_and(PlanNode::mark_incomplete);
        if changed {
            debug!(graph = %self.id, node = node_id, "node reopened");
            self.touch();
        }
        changed
    }

    /// Edit a node's descriptive fields in place.
    ///
    /// The closure may change title, type, sort index, duration, assignment,
    /// and metadata. Id and completion state are restored afterwards: ids
    /// are fixed for the node's lifetime and completion only moves through
    /// [`PlanGraph::mark_node_completed`] / [`PlanGraph::mark_node_incomplete`].
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidNodeReference`] if the id is absent.
    pub fn update_node(
        &mut self,
        node_id: &str,
        edit: impl FnOnce(&mut PlanNode),
    ) -> Result<(), GraphError> {
        let Some(pos) = self.node_position(node_id) else {
            return Err(GraphError::InvalidNodeReference {
                id: node_id.to_string(),
            });
        };

        let original = self.nodes[pos].clone();
        let mut edited = original.clone();
        edit(&mut edited);
        edited.id = original.id.clone();
        edited.is_completed = original.is_completed;
        edited.completed_at = original.completed_at;

        if edited != original {
            debug!(graph = %self.id, node = node_id, "node updated");
            self.nodes[pos] = edited;
            self.touch();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
