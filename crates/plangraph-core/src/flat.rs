//! Conversion to and from the flat, ordered-step plan representation.
//!
//! # Overview
//!
//! Older plan documents store an assignment as an ordered list of
//! [`PlanStep`]s, each carrying the ids of the steps it waits on. That
//! format stays the exchange format for persistence and sync; the graph is
//! built from it on load and written back onto it after editing.
//!
//! ## Import
//!
//! [`PlanGraph::from_flat_plan`] is best-effort. Every step becomes a node
//! (all nodes are added before any edge, so prerequisite lists may refer
//! forward), then each `prerequisite_ids` entry becomes one hard edge
//! `prerequisite → step`. A step or edge the graph refuses (duplicate id,
//! unknown prerequisite, self-loop, cycle) is skipped with a warning
//! instead of aborting the conversion. Callers that need strict import run
//! [`PlanGraph::validate`] afterwards or compare edge counts.
//!
//! ## Export
//!
//! [`PlanGraph::to_flat_plan`] copies completion state, `sort_index`, and
//! the recomputed prerequisite list back onto every step whose id exists in
//! the graph. Steps with no matching node are left as they were. The flat
//! plan's version is set to the graph's version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{NodeMetadata, NodeType, PlanGraph, PlanNode};

// ---------------------------------------------------------------------------
// Flat types
// ---------------------------------------------------------------------------

/// Step kinds of the flat representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    #[default]
    Task,
    Reading,
    Practice,
    Review,
    Research,
    Writing,
    Preparation,
    Exam,
    Quiz,
    Lab,
}

impl From<StepType> for NodeType {
    fn from(step: StepType) -> Self {
        match step {
            StepType::Task => Self::Task,
            StepType::Reading => Self::Reading,
            StepType::Practice => Self::Practice,
            StepType::Review => Self::Review,
            StepType::Research => Self::Research,
            StepType::Writing => Self::Writing,
            StepType::Preparation => Self::Preparation,
            StepType::Exam => Self::Exam,
            StepType::Quiz => Self::Quiz,
            StepType::Lab => Self::Lab,
        }
    }
}

impl From<NodeType> for StepType {
    fn from(node: NodeType) -> Self {
        match node {
            NodeType::Task => Self::Task,
            NodeType::Reading => Self::Reading,
            NodeType::Practice => Self::Practice,
            NodeType::Review => Self::Review,
            NodeType::Research => Self::Research,
            NodeType::Writing => Self::Writing,
            NodeType::Preparation => Self::Preparation,
            NodeType::Exam => Self::Exam,
            NodeType::Quiz => Self::Quiz,
            NodeType::Lab => Self::Lab,
        }
    }
}

/// One step of a flat plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub step_type: StepType,
    #[serde(default)]
    pub sort_index: i64,
    /// Seconds.
    #[serde(default)]
    pub estimated_duration: u64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_by: Option<DateTime<Utc>>,
    /// Ids of steps that must be finished first.
    #[serde(default)]
    pub prerequisite_ids: Vec<String>,
}

impl PlanStep {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            step_type: StepType::default(),
            sort_index: 0,
            estimated_duration: 0,
            is_completed: false,
            completed_at: None,
            notes: None,
            recommended_start_date: None,
            due_by: None,
            prerequisite_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn after(mut self, prerequisite: impl Into<String>) -> Self {
        self.prerequisite_ids.push(prerequisite.into());
        self
    }

    fn to_node(&self, assignment_id: Option<&str>) -> PlanNode {
        PlanNode {
            id: self.id.clone(),
            assignment_id: assignment_id.map(str::to_string),
            title: self.title.clone(),
            node_type: self.step_type.into(),
            sort_index: self.sort_index,
            estimated_duration: self.estimated_duration,
            is_completed: self.is_completed,
            completed_at: self.completed_at.filter(|_| self.is_completed),
            metadata: NodeMetadata {
                notes: self.notes.clone(),
                recommended_start: self.recommended_start_date,
                due_by: self.due_by,
                ..NodeMetadata::default()
            },
        }
    }
}

/// A whole flat plan for one assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPlan {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub steps: Vec<PlanStep>,
    #[serde(default = "first_version")]
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AssignmentPlan {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            assignment_id: None,
            title: title.into(),
            steps: Vec::new(),
            version: 1,
            updated_at: None,
        }
    }

    #[must_use]
    pub fn with_step(mut self, step: PlanStep) -> Self {
        self.steps.push(step);
        self
    }
}

const fn first_version() -> u64 {
    1
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

impl PlanGraph {
    /// Build a graph from a flat plan, skipping anything the graph rejects.
    ///
    /// The graph takes the plan's id, title, and version.
    #[must_use]
    pub fn from_flat_plan(plan: &AssignmentPlan) -> Self {
        let mut graph = Self::with_id(plan.id.clone(), plan.title.clone());

        for step in &plan.steps {
            if let Err(err) = graph.add_node(step.to_node(plan.assignment_id.as_deref())) {
                warn!(plan = %plan.id, step = %step.id, error = %err, "skipping step");
            }
        }

        for step in &plan.steps {
            for prerequisite in &step.prerequisite_ids {
                if let Err(err) = graph.add_edge(prerequisite, &step.id) {
                    warn!(
                        plan = %plan.id,
                        from = %prerequisite,
                        to = %step.id,
                        error = %err,
                        "skipping prerequisite"
                    );
                }
            }
        }

        graph.metadata.version = plan.version;
        debug!(
            plan = %plan.id,
            steps = plan.steps.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "imported flat plan"
        );
        graph
    }

    /// Write the graph's state back onto `plan`, returning the updated copy.
    #[must_use]
    pub fn to_flat_plan(&self, plan: &AssignmentPlan) -> AssignmentPlan {
        let mut updated = plan.clone();
        for step in &mut updated.steps {
            let Some(node) = self.get_node(&step.id) else {
                continue;
            };
            step.is_completed = node.is_completed;
            step.completed_at = node.completed_at;
            step.sort_index = node.sort_index;
            step.prerequisite_ids = self
                .get_prerequisites(&node.id)
                .into_iter()
                .map(|prereq| prereq.id.clone())
                .collect();
        }
        updated.version = self.metadata.version;
        updated.updated_at = Some(self.metadata.modified_at);
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn essay_plan() -> AssignmentPlan {
        let at = Utc.with_ymd_and_hms(2025, 2, 10, 18, 30, 0).unwrap();
        let mut research = PlanStep::new("research", "Find sources");
        research.step_type = StepType::Research;
        research.is_completed = true;
        research.completed_at = Some(at);

        let mut outline = PlanStep::new("outline", "Outline").after("research");
        outline.sort_index = 1;
        outline.step_type = StepType::Writing;

        let mut draft = PlanStep::new("draft", "Draft").after("outline");
        draft.sort_index = 2;
        draft.estimated_duration = 7200;
        draft.notes = Some("aim for 1500 words".to_string());

        let mut plan = AssignmentPlan::new("plan-1", "History essay")
            .with_step(research)
            .with_step(outline)
            .with_step(draft);
        plan.assignment_id = Some("hist-101-essay".to_string());
        plan.version = 7;
        plan
    }

    #[test]
    fn import_maps_steps_and_prerequisites() {
        let graph = PlanGraph::from_flat_plan(&essay_plan());

        assert_eq!(graph.id, "plan-1");
        assert_eq!(graph.metadata.name, "History essay");
        assert_eq!(graph.metadata.version, 7);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.get_edge("research", "outline").is_some());
        assert!(graph.get_edge("outline", "draft").is_some());

        let draft = graph.get_node("draft").unwrap();
        assert_eq!(draft.node_type, NodeType::Task);
        assert_eq!(draft.estimated_duration, 7200);
        assert_eq!(draft.assignment_id.as_deref(), Some("hist-101-essay"));
        assert_eq!(draft.metadata.notes.as_deref(), Some("aim for 1500 words"));
        assert!(graph.get_node("research").unwrap().is_completed);
    }

    #[test]
    fn import_allows_forward_references() {
        let plan = AssignmentPlan::new("p", "forward")
            .with_step(PlanStep::new("b", "B").after("a"))
            .with_step(PlanStep::new("a", "A"));
        let graph = PlanGraph::from_flat_plan(&plan);
        assert!(graph.get_edge("a", "b").is_some());
    }

    #[test]
    fn import_skips_bad_steps_and_edges() {
        let plan = AssignmentPlan::new("p", "messy")
            .with_step(PlanStep::new("a", "A").after("b"))
            .with_step(PlanStep::new("b", "B").after("a").after("ghost"))
            .with_step(PlanStep::new("a", "A again"))
            .with_step(PlanStep::new("c", "C").after("c").after("a").after("a"));

        let graph = PlanGraph::from_flat_plan(&plan);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.get_node("a").unwrap().title, "A");
        // b → a accepted; a → b closes a cycle; ghost unknown; c → c is a
        // self-loop; the second a → c is a duplicate.
        let edges: Vec<String> = graph.edges().iter().map(ToString::to_string).collect();
        assert_eq!(edges, ["b → a", "a → c"]);
        assert!(graph.is_valid());
    }

    #[test]
    fn incomplete_step_drops_stray_timestamp() {
        let mut step = PlanStep::new("a", "A");
        step.completed_at = Some(Utc::now());
        let graph = PlanGraph::from_flat_plan(&AssignmentPlan::new("p", "t").with_step(step));
        assert!(graph.get_node("a").unwrap().completed_at.is_none());
    }

    #[test]
    fn export_copies_state_back() {
        let plan = essay_plan();
        let mut graph = PlanGraph::from_flat_plan(&plan);
        let at = Utc.with_ymd_and_hms(2025, 2, 11, 9, 0, 0).unwrap();
        graph.mark_node_completed("outline", at);
        graph.remove_edge("outline", "draft");
        graph.add_edge("research", "draft").unwrap();

        let out = graph.to_flat_plan(&plan);

        assert_eq!(out.version, graph.metadata.version);
        assert_eq!(out.version, 10);
        let outline = &out.steps[1];
        assert!(outline.is_completed);
        assert_eq!(outline.completed_at, Some(at));
        assert_eq!(out.steps[2].prerequisite_ids, ["research"]);
        assert_eq!(out.steps[2].notes.as_deref(), Some("aim for 1500 words"));
    }

    #[test]
    fn export_leaves_unknown_steps_alone() {
        let plan = essay_plan().with_step(PlanStep::new("extra", "Not in graph").after("nowhere"));
        let mut graph = PlanGraph::from_flat_plan(&plan);
        graph.remove_node("draft");

        let out = graph.to_flat_plan(&plan);
        assert_eq!(out.steps[2], plan.steps[2]);
        assert_eq!(out.steps[3], plan.steps[3]);
    }

    #[test]
    fn round_trip_preserves_completion_and_prerequisites() {
        let plan = essay_plan();
        let out = PlanGraph::from_flat_plan(&plan).to_flat_plan(&plan);

        for (before, after) in plan.steps.iter().zip(&out.steps) {
            assert_eq!(before.is_completed, after.is_completed);
            assert_eq!(before.completed_at, after.completed_at);
            assert_eq!(before.prerequisite_ids, after.prerequisite_ids);
        }
        assert_eq!(out.version, plan.version);
    }

    #[test]
    fn step_type_mapping_is_total() {
        for kind in NodeType::ALL {
            assert_eq!(NodeType::from(StepType::from(kind)), kind);
        }
    }

    #[test]
    fn flat_json_defaults() {
        let plan: AssignmentPlan = serde_json::from_str(
            r#"{"id":"p","title":"T","steps":[{"id":"s","title":"S","step_type":"quiz"}]}"#,
        )
        .unwrap();
        assert_eq!(plan.version, 1);
        assert_eq!(plan.steps[0].step_type, StepType::Quiz);
        assert!(plan.steps[0].prerequisite_ids.is_empty());
    }
}
