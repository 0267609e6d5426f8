//! Structural violations and mutation failures.
//!
//! One closed set of kinds serves both error surfaces:
//!
//! - [`PlanGraph::validate`](crate::model::PlanGraph::validate) returns every
//!   currently-true violation as a `Vec<GraphError>`.
//! - Fallible mutations (`add_node`, `add_edge`) return exactly one
//!   `GraphError` and leave the graph unmodified.

use serde::Serialize;

use crate::graph::cycles::CyclePath;
use crate::model::PlanEdge;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphError {
    /// The edges contain (or would contain) a directed cycle.
    #[error("cycle detected: {path}")]
    CycleDetected { path: CyclePath },

    /// An edge references a node id that is not in the graph.
    #[error("orphan edge {edge}: endpoint not in graph")]
    OrphanEdge { edge: PlanEdge },

    /// Two edges share the same `(from, to)` pair.
    #[error("duplicate edge {edge}")]
    DuplicateEdge { edge: PlanEdge },

    #[error("duplicate node id '{id}'")]
    DuplicateNodeId { id: String },

    /// An edge whose prerequisite and dependent are the same node.
    #[error("self-loop on '{id}'")]
    SelfLoop { id: String },

    /// A mutation named a node that does not exist.
    #[error("unknown node '{id}'")]
    InvalidNodeReference { id: String },
}

impl GraphError {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::CycleDetected { .. } => "E2003",
            Self::OrphanEdge { .. } => "E2101",
            Self::DuplicateEdge { .. } => "E2102",
            Self::DuplicateNodeId { .. } => "E2103",
            Self::SelfLoop { .. } => "E2104",
            Self::InvalidNodeReference { .. } => "E2001",
        }
    }

    /// Short snake_case name of the kind, used as the CLI error code.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CycleDetected { .. } => "cycle_detected",
            Self::OrphanEdge { .. } => "orphan_edge",
            Self::DuplicateEdge { .. } => "duplicate_edge",
            Self::DuplicateNodeId { .. } => "duplicate_node_id",
            Self::SelfLoop { .. } => "self_loop",
            Self::InvalidNodeReference { .. } => "invalid_node_reference",
        }
    }

    /// Fixed one-line description of the kind, without instance details.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::CycleDetected { .. } => "Dependency cycle",
            Self::OrphanEdge { .. } => "Dependency on a missing step",
            Self::DuplicateEdge { .. } => "Repeated dependency",
            Self::DuplicateNodeId { .. } => "Duplicate step id",
            Self::SelfLoop { .. } => "Step depends on itself",
            Self::InvalidNodeReference { .. } => "Unknown step",
        }
    }

    /// Optional remediation hint that can be surfaced to users.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CycleDetected { .. } => {
                Some("Remove or reverse one dependency on the cycle to keep the plan acyclic.")
            }
            Self::OrphanEdge { .. } => {
                Some("Remove the dependency or add the missing step to the plan.")
            }
            Self::DuplicateEdge { .. } => Some("Drop the repeated dependency; one link is enough."),
            Self::DuplicateNodeId { .. } => Some("Give every step a unique id."),
            Self::SelfLoop { .. } => Some("A step cannot depend on itself."),
            Self::InvalidNodeReference { .. } => {
                Some("Check the step id; list steps with `plg order`.")
            }
        }
    }
}
