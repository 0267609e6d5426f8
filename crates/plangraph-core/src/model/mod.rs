//! Plain-data records for plan graphs.
//!
//! - [`node`]: [`PlanNode`], its [`NodeType`] and free-form metadata.
//! - [`edge`]: [`PlanEdge`] (prerequisite → dependent) and hard/soft metadata.
//! - [`graph`]: the [`PlanGraph`] aggregate root.
//!
//! Everything here serializes with `serde`; persistence itself lives
//! outside this crate.

pub mod edge;
pub mod graph;
pub mod node;

pub use edge::{EdgeKind, EdgeMetadata, PlanEdge};
pub use graph::{GraphMetadata, PlanGraph};
pub use node::{NodeMetadata, NodeType, ParseEnumError, PlanNode, Priority};
