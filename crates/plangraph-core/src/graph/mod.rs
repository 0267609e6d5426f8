//! Algorithms over [`PlanGraph`](crate::model::PlanGraph).
//!
//! # Overview
//!
//! Each submodule adds one group of methods to `PlanGraph`. Everything is
//! computed from the ordered node and edge lists on every call; nothing is
//! cached between calls.
//!
//! ## Layers
//!
//! ```text
//! cycles    detect_cycle / has_cycle        (three-color DFS)
//!    ↓
//! validate  validate / is_valid             (batch diagnostics)
//! topo      topological_sort / _layers      (Kahn, min-heap tie-break)
//!    ↓
//! blocking  prerequisites, dependents, blocked / available / roots / leaves
//! stats     get_statistics, longest_path, critical_path
//! mutate    add/remove node and edge, completion toggles, update_node
//! export    to_petgraph, to_dot, content_hash
//! ```
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use plangraph_core::model::{NodeType, PlanGraph, PlanNode};
//!
//! let mut graph = PlanGraph::new("Essay");
//! graph.add_node(PlanNode::new("outline", "Outline", NodeType::Writing))?;
//! graph.add_node(PlanNode::new("draft", "Draft", NodeType::Writing))?;
//! graph.add_edge("outline", "draft")?;
//!
//! for node in graph.topological_sort().unwrap_or_default() {
//!     println!("{}", node.title);
//! }
//! ```

pub mod blocking;
pub mod cycles;
pub mod export;
pub mod mutate;
pub mod stats;
pub mod topo;
pub mod validate;

pub use cycles::CyclePath;
pub use stats::GraphStatistics;
