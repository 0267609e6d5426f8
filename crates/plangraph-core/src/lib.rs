#![forbid(unsafe_code)]
//! plangraph-core library.
//!
//! A plan is a set of work steps ([`PlanNode`]) joined by prerequisite
//! edges ([`PlanEdge`]) that must always form a DAG. [`PlanGraph`] owns
//! both lists; its mutation methods either commit a valid state or return
//! a [`GraphError`] and leave the graph untouched.
//!
//! # Conventions
//!
//! - **Errors**: graph operations return [`GraphError`]; file and config
//!   loading use `anyhow::Result`.
//! - **Logging**: `tracing` macros (`debug!` for mutations, `trace!`
//!   inside algorithms, `warn!` for skipped import input).

pub mod config;
pub mod error;
pub mod flat;
pub mod graph;
pub mod model;

pub use error::GraphError;
pub use flat::{AssignmentPlan, PlanStep, StepType};
pub use graph::{CyclePath, GraphStatistics};
pub use model::{
    EdgeKind, EdgeMetadata, GraphMetadata, NodeMetadata, NodeType, PlanEdge, PlanGraph, PlanNode,
    Priority,
};
