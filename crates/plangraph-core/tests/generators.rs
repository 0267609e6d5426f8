#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use plangraph_core::{AssignmentPlan, NodeType, PlanGraph, PlanNode, PlanStep};
use proptest::prelude::*;

/// Node count plus a list of `(from, to)` index pairs to attempt as edges.
#[derive(Debug, Clone)]
pub struct GraphRecipe {
    pub sort_indices: Vec<i64>,
    pub edge_attempts: Vec<(usize, usize)>,
}

impl GraphRecipe {
    pub fn node_id(idx: usize) -> String {
        format!("n{idx:02}")
    }

    /// Build the graph through the public mutation API, ignoring rejected
    /// edges.
    pub fn build(&self) -> PlanGraph {
        let mut graph = PlanGraph::with_id("prop", "generated");
        for (idx, sort_index) in self.sort_indices.iter().enumerate() {
            let node = PlanNode::new(Self::node_id(idx), format!("Step {idx}"), NodeType::Task)
                .with_sort_index(*sort_index)
                .with_duration(600);
            graph.add_node(node).unwrap();
        }
        for (from, to) in &self.edge_attempts {
            let _ = graph.add_edge(&Self::node_id(*from), &Self::node_id(*to));
        }
        graph
    }
}

pub fn arb_recipe() -> impl Strategy<Value = GraphRecipe> {
    (1usize..12).prop_flat_map(|n| {
        (
            prop::collection::vec(-3i64..4, n),
            prop::collection::vec((0..n, 0..n), 0..40),
        )
            .prop_map(|(sort_indices, edge_attempts)| GraphRecipe {
                sort_indices,
                edge_attempts,
            })
    })
}

/// A flat plan whose prerequisites only point at earlier steps, so every
/// listed prerequisite survives import.
pub fn arb_flat_plan() -> impl Strategy<Value = AssignmentPlan> {
    (1usize..10).prop_flat_map(|n| {
        prop::collection::vec(
            (
                any::<bool>(),
                0i64..1_000_000,
                prop::collection::btree_set(0..n, 0..4),
            ),
            n,
        )
        .prop_map(|rows| {
            let mut plan = AssignmentPlan::new("flat", "generated plan");
            for (idx, (done, offset, prereqs)) in rows.into_iter().enumerate() {
                let mut step = PlanStep::new(GraphRecipe::node_id(idx), format!("Step {idx}"));
                step.sort_index = i64::try_from(idx).unwrap();
                if done {
                    step.is_completed = true;
                    step.completed_at = Utc.timestamp_opt(1_700_000_000 + offset, 0).single();
                }
                step.prerequisite_ids = prereqs
                    .into_iter()
                    .filter(|p| *p < idx)
                    .map(GraphRecipe::node_id)
                    .collect();
                plan.steps.push(step);
            }
            plan
        })
    })
}
