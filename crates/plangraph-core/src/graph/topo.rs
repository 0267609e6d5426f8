//! Deterministic topological ordering.
//!
//! # Algorithm
//!
//! Kahn's algorithm: compute the in-degree of every node, seed a ready
//! queue with the zero in-degree nodes, then repeatedly dequeue one node,
//! emit it, and decrement the in-degree of its dependents.
//!
//! # Determinism
//!
//! The ready queue is a min-heap keyed by `(sort_index, node position)`.
//! Whenever several nodes are ready at once, the smallest `sort_index`
//! leaves first; equal indices fall back to the order nodes were added.
//! Calling the sorter twice on an unmodified graph yields identical output.
//!
//! Edges with an endpoint outside the node set are ignored here; they are
//! reported by [`PlanGraph::validate`].

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use tracing::trace;

use crate::model::{PlanGraph, PlanNode};

/// In-degree and dependent lists keyed by node position.
struct KahnState {
    in_degree: Vec<usize>,
    dependents: Vec<Vec<usize>>,
}

impl KahnState {
    fn build(graph: &PlanGraph) -> Self {
        let positions: HashMap<&str, usize> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(pos, node)| (node.id.as_str(), pos))
            .collect();

        let mut in_degree = vec![0; graph.nodes.len()];
        let mut dependents = vec![Vec::new(); graph.nodes.len()];

        for edge in &graph.edges {
            let (Some(&from), Some(&to)) = (
                positions.get(edge.from_node_id.as_str()),
                positions.get(edge.to_node_id.as_str()),
            ) else {
                continue;
            };
            in_degree[to] += 1;
            dependents[from].push(to);
        }

        Self {
            in_degree,
            dependents,
        }
    }
}

impl PlanGraph {
    /// Order nodes so every prerequisite precedes its dependents.
    ///
    /// Returns `None` if the graph contains a cycle.
    #[must_use]
    pub fn topological_sort(&self) -> Option<Vec<&PlanNode>> {
        if self.detect_cycle().is_some() {
            return None;
        }

        let KahnState {
            mut in_degree,
            dependents,
        } = KahnState::build(self);

        let key = |pos: usize| Reverse((self.nodes[pos].sort_index, pos));

        let mut ready: BinaryHeap<Reverse<(i64, usize)>> = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(pos, _)| key(pos))
            .collect();

        let mut order: Vec<&PlanNode> = Vec::with_capacity(self.nodes.len());

        while let Some(Reverse((_, pos))) = ready.pop() {
            order.push(&self.nodes[pos]);
            for &next in &dependents[pos] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(key(next));
                }
            }
        }

        if order.len() < self.nodes.len() {
            trace!(
                graph = %self.id,
                sorted = order.len(),
                total = self.nodes.len(),
                "kahn's algorithm left nodes unsorted"
            );
            return None;
        }

        Some(order)
    }

    /// Group nodes into layers that can be worked on in parallel.
    ///
    /// Layer `k` holds every node whose prerequisites all sit in layers
    /// `< k`. Within a layer nodes are ordered by `sort_index`, then by
    /// position. Returns `None` if the graph contains a cycle.
    #[must_use]
    pub fn topological_layers(&self) -> Option<Vec<Vec<&PlanNode>>> {
        if self.detect_cycle().is_some() {
            return None;
        }

        let KahnState {
            mut in_degree,
            dependents,
        } = KahnState::build(self);

        let by_sort_key = |a: &usize, b: &usize| {
            (self.nodes[*a].sort_index, *a).cmp(&(self.nodes[*b].sort_index, *b))
        };

        let mut current: Vec<usize> = in_degree
            .iter()
            .enumerate()
            .filter_map(|(pos, &deg)| (deg == 0).then_some(pos))
            .collect();

        let mut layers: Vec<Vec<&PlanNode>> = Vec::new();
        let mut placed = 0;

        while !current.is_empty() {
            current.sort_by(by_sort_key);
            let mut next_layer = Vec::new();

            for &pos in &current {
                for &dependent in &dependents[pos] {
                    in_degree[dependent] -= 1;
                    if in_degree[dependent] == 0 {
                        next_layer.push(dependent);
                    }
                }
            }

            placed += current.len();
            layers.push(current.iter().map(|&pos| &self.nodes[pos]).collect());
            current = next_layer;
        }

        (placed == self.nodes.len()).then_some(layers)
    }
}
