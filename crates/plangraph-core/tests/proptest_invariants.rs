use std::collections::HashMap;

use plangraph_core::PlanGraph;
use proptest::prelude::*;

#[path = "generators.rs"]
mod generators;
use generators::*;

fn positions(graph: &PlanGraph) -> Option<HashMap<String, usize>> {
    graph.topological_sort().map(|order| {
        order
            .iter()
            .enumerate()
            .map(|(pos, node)| (node.id.clone(), pos))
            .collect()
    })
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn accepted_edges_never_form_a_cycle(recipe in arb_recipe()) {
        let graph = recipe.build();
        prop_assert!(graph.detect_cycle().is_none());
        prop_assert!(graph.is_valid());
    }

    #[test]
    fn rejected_edge_leaves_graph_unchanged(recipe in arb_recipe(), from in 0usize..12, to in 0usize..12) {
        let mut graph = recipe.build();
        let before = graph.clone();
        let result = graph.add_edge(&GraphRecipe::node_id(from), &GraphRecipe::node_id(to));
        if result.is_err() {
            prop_assert_eq!(graph, before);
        } else {
            prop_assert_eq!(graph.edge_count(), before.edge_count() + 1);
            prop_assert_eq!(graph.metadata.version, before.metadata.version + 1);
        }
    }

    #[test]
    fn remove_edge_is_idempotent(recipe in arb_recipe(), pick in any::<prop::sample::Index>()) {
        let mut graph = recipe.build();
        let (from, to) = match graph.edges().get(pick.index(graph.edge_count().max(1))) {
            Some(edge) => (edge.from_node_id.clone(), edge.to_node_id.clone()),
            None => ("n00".to_string(), "n01".to_string()),
        };

        graph.remove_edge(&from, &to);
        let once = graph.clone();
        prop_assert!(!graph.remove_edge(&from, &to));
        prop_assert_eq!(graph, once);
    }

    #[test]
    fn remove_node_cascades(recipe in arb_recipe(), victim in 0usize..12) {
        let mut graph = recipe.build();
        let id = GraphRecipe::node_id(victim);
        let existed = graph.contains_node(&id);

        prop_assert_eq!(graph.remove_node(&id).is_some(), existed);
        prop_assert!(graph.edges().iter().all(|edge| !edge.touches(&id)));
        prop_assert!(graph.is_valid());
    }

    #[test]
    fn topological_order_respects_every_edge(recipe in arb_recipe()) {
        let graph = recipe.build();
        let pos = positions(&graph).expect("acyclic graph must sort");
        prop_assert_eq!(pos.len(), graph.node_count());
        for edge in graph.edges() {
            prop_assert!(pos[&edge.from_node_id] < pos[&edge.to_node_id]);
        }
    }

    #[test]
    fn topological_order_is_deterministic(recipe in arb_recipe()) {
        let graph = recipe.build();
        let first: Vec<String> = graph.topological_sort().unwrap().iter().map(|n| n.id.clone()).collect();
        let second: Vec<String> = graph.topological_sort().unwrap().iter().map(|n| n.id.clone()).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn layers_cover_the_sort(recipe in arb_recipe()) {
        let graph = recipe.build();
        let layers = graph.topological_layers().expect("acyclic graph must layer");
        let total: usize = layers.iter().map(Vec::len).sum();
        prop_assert_eq!(total, graph.node_count());
        prop_assert_eq!(layers.len(), graph.longest_path() + 1);
    }

    #[test]
    fn critical_path_is_a_real_chain(recipe in arb_recipe()) {
        let graph = recipe.build();
        let path = graph.critical_path();
        prop_assert_eq!(path.len(), graph.longest_path() + 1);
        for pair in path.windows(2) {
            prop_assert!(graph.get_edge(&pair[0].id, &pair[1].id).is_some());
        }
    }

    #[test]
    fn flat_round_trip_preserves_state(plan in arb_flat_plan()) {
        let graph = PlanGraph::from_flat_plan(&plan);
        prop_assert_eq!(graph.node_count(), plan.steps.len());

        let back = graph.to_flat_plan(&plan);
        for (before, after) in plan.steps.iter().zip(&back.steps) {
            prop_assert_eq!(before.is_completed, after.is_completed);
            prop_assert_eq!(before.completed_at, after.completed_at);
            prop_assert_eq!(&before.prerequisite_ids, &after.prerequisite_ids);
        }
    }
}
