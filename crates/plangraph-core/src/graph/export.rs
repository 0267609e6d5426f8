//! Conversions out of the plan graph model.
//!
//! - [`PlanGraph::to_petgraph`] builds a [`petgraph`] directed graph so
//!   callers can run library algorithms over the same structure.
//! - [`PlanGraph::to_dot`] renders Graphviz source; soft edges are dashed
//!   and completed nodes are greyed out.
//! - [`PlanGraph::content_hash`] is a BLAKE3 digest of node ids, completion
//!   flags, and the sorted edge list. Persistence layers compare it against
//!   a stored value to skip rewriting unchanged graphs.
//!
//! Edges with an endpoint outside the node set are dropped from the
//! petgraph and Graphviz views.

use std::collections::HashMap;

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::model::{EdgeKind, PlanGraph};

impl PlanGraph {
    /// Node weights are node ids, edge weights are the dependency kind.
    /// Node indices follow node order.
    #[must_use]
    pub fn to_petgraph(&self) -> DiGraph<String, EdgeKind> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(self.nodes.len());

        for node in &self.nodes {
            let idx = graph.add_node(node.id.clone());
            index.entry(node.id.as_str()).or_insert(idx);
        }

        for edge in &self.edges {
            let (Some(&from), Some(&to)) = (
                index.get(edge.from_node_id.as_str()),
                index.get(edge.to_node_id.as_str()),
            ) else {
                continue;
            };
            graph.add_edge(from, to, edge.metadata.kind());
        }

        graph
    }

    /// Graphviz `digraph` source for the plan.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let graph = self.to_petgraph();
        let edge_attr = |_: &DiGraph<String, EdgeKind>, edge: EdgeReference<'_, EdgeKind>| {
            match edge.weight() {
                EdgeKind::Hard => String::new(),
                EdgeKind::Soft => "style = dashed".to_string(),
            }
        };
        let node_attr = |_: &DiGraph<String, EdgeKind>, (_, id): (NodeIndex, &String)| {
            if self.get_node(id).is_some_and(|node| node.is_completed) {
                "style = filled fillcolor = lightgrey".to_string()
            } else {
                String::new()
            }
        };
        let dot = Dot::with_attr_getters(&graph, &[Config::EdgeNoLabel], &edge_attr, &node_attr);
        format!("{dot}")
    }

    /// `blake3:`-prefixed digest of the graph structure and completion state.
    ///
    /// Independent of node and edge insertion order. Titles, durations, and
    /// other descriptive fields do not contribute.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut nodes: Vec<(&str, bool)> = self
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), node.is_completed))
            .collect();
        nodes.sort_unstable();

        let mut edges: Vec<(&str, &str)> = self
            .edges
            .iter()
            .map(|edge| (edge.from_node_id.as_str(), edge.to_node_id.as_str()))
            .collect();
        edges.sort_unstable();

        let mut hasher = blake3::Hasher::new();
        for (id, completed) in nodes {
            hash_id(&mut hasher, id);
            hasher.update(if completed { b"\x01" } else { b"\x00" });
        }
        hasher.update(b"\xff");
        for (from, to) in edges {
            hash_id(&mut hasher, from);
            hash_id(&mut hasher, to);
        }
        format!("blake3:{}", hasher.finalize())
    }
}

/// Length-prefixed so adjacent ids cannot run together.
fn hash_id(hasher: &mut blake3::Hasher, id: &str) {
    hasher.update(&(id.len() as u64).to_le_bytes());
    hasher.update(id.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeMetadata, GraphMetadata, NodeType, PlanEdge, PlanNode};
    use chrono::Utc;

    fn raw_graph(nodes: &[&str], edges: &[(&str, &str)]) -> PlanGraph {
        PlanGraph::from_parts(
            "test".to_string(),
            nodes
                .iter()
                .map(|id| PlanNode::new(*id, *id, NodeType::Task))
                .collect(),
            edges.iter().map(|(a, b)| PlanEdge::new(*a, *b)).collect(),
            GraphMetadata::new("test"),
        )
    }

    #[test]
    fn petgraph_mirrors_nodes_and_edges() {
        let mut graph = raw_graph(&["a", "b", "c"], &[("a", "b")]);
        graph
            .edges
            .push(PlanEdge::new("b", "c").with_metadata(EdgeMetadata::soft()));

        let pg = graph.to_petgraph();
        assert_eq!(pg.node_count(), 3);
        assert_eq!(pg.edge_count(), 2);
        assert_eq!(pg[NodeIndex::new(0)], "a");

        let kinds: Vec<EdgeKind> = pg.edge_weights().copied().collect();
        assert_eq!(kinds, vec![EdgeKind::Hard, EdgeKind::Soft]);
        assert!(!petgraph::algo::is_cyclic_directed(&pg));
    }

    #[test]
    fn petgraph_drops_orphan_edges() {
        let graph = raw_graph(&["a"], &[("a", "ghost")]);
        let pg = graph.to_petgraph();
        assert_eq!(pg.node_count(), 1);
        assert_eq!(pg.edge_count(), 0);
    }

    #[test]
    fn dot_output_marks_soft_and_completed() {
        let mut graph = raw_graph(&["draft", "review"], &[]);
        graph.edges.push(
            PlanEdge::new("draft", "review").with_metadata(EdgeMetadata::soft()),
        );
        graph.nodes[0].mark_completed(Utc::now());

        let dot = graph.to_dot();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("\"draft\""));
        assert!(dot.contains("\"review\""));
        assert!(dot.contains("style = dashed"));
        assert!(dot.contains("fillcolor = lightgrey"));
    }

    #[test]
    fn content_hash_ignores_insertion_order() {
        let a = raw_graph(&["x", "y", "z"], &[("x", "y"), ("y", "z")]);
        let b = raw_graph(&["z", "y", "x"], &[("y", "z"), ("x", "y")]);
        assert!(a.content_hash().starts_with("blake3:"));
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn content_hash_tracks_edges_and_completion() {
        let base = raw_graph(&["x", "y"], &[]);
        let linked = raw_graph(&["x", "y"], &[("x", "y")]);
        assert_ne!(base.content_hash(), linked.content_hash());

        let mut done = base.clone();
        done.nodes[0].mark_completed(Utc::now());
        assert_ne!(base.content_hash(), done.content_hash());
    }

    #[test]
    fn content_hash_separates_ids_from_completion_flags() {
        let mut two = raw_graph(&["a", "b"], &[]);
        two.nodes[0].mark_completed(Utc::now());
        let one = raw_graph(&["a\x01b"], &[]);
        assert_ne!(two.content_hash(), one.content_hash());

        let split = raw_graph(&["ab", "c"], &[("ab", "c")]);
        let joined = raw_graph(&["a", "bc"], &[("a", "bc")]);
        assert_ne!(split.content_hash(), joined.content_hash());
    }

    #[test]
    fn dot_output_is_plain_for_hard_incomplete_graph() {
        let graph = raw_graph(&["a", "b"], &[("a", "b")]);
        let dot = graph.to_dot();
        assert!(dot.contains("0 -> 1"));
        assert!(!dot.contains("dashed"));
        assert!(!dot.contains("lightgrey"));
    }
}
