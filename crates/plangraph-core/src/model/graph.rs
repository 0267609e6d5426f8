use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::edge::PlanEdge;
use super::node::PlanNode;

/// Descriptive metadata for a whole plan graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Incremented by every mutation that changes the graph.
    pub version: u64,
}

impl GraphMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: None,
            created_at: now,
            modified_at: now,
            version: 1,
        }
    }
}

/// The aggregate root: an ordered node list plus a dependency edge list.
///
/// Nodes and edges are only reachable by shared reference; every change
/// goes through the mutation methods in [`crate::graph::mutate`], which
/// either commit a valid state or leave the graph untouched.
///
/// Edge insertion order is retained so that traversal order, and
/// therefore every derived ordering, is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanGraph {
    pub id: String,
    #[serde(default)]
    pub(crate) nodes: Vec<PlanNode>,
    #[serde(default)]
    pub(crate) edges: Vec<PlanEdge>,
    pub metadata: GraphMetadata,
}

impl PlanGraph {
    /// Create an empty graph with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), name)
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            metadata: GraphMetadata::new(name),
        }
    }

    /// Assemble a graph from raw parts without any checks.
    ///
    /// Intended for loaders and diagnostics. The result may violate any
    /// structural invariant; call [`PlanGraph::validate`] to audit it.
    pub const fn from_parts(
        id: String,
        nodes: Vec<PlanNode>,
        edges: Vec<PlanEdge>,
        metadata: GraphMetadata,
    ) -> Self {
        Self {
            id,
            nodes,
            edges,
            metadata,
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[PlanNode] {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &[PlanEdge] {
        &self.edges
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn get_node(&self, id: &str) -> Option<&PlanNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }

    #[must_use]
    pub fn get_edge(&self, from: &str, to: &str) -> Option<&PlanEdge> {
        self.edges.iter().find(|edge| edge.connects(from, to))
    }

    pub(crate) fn node_position(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.id == id)
    }

    /// Record that a state-changing mutation happened.
    pub(crate) fn touch(&mut self) {
        self.metadata.version += 1;
        self.metadata.modified_at = Utc::now();
    }
}
