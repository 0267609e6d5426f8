//! `plg show`: one step with its neighbourhood.

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use plangraph_core::{EdgeKind, EdgeMetadata, GraphError, NodeMetadata, PlanGraph, PlanNode};
use serde::Serialize;

use crate::output::{OutputMode, fail_with, pretty_kv, pretty_section, render};
use crate::store::Document;

/// Arguments for `plg show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Plan document to read.
    pub file: PathBuf,

    /// Step id.
    pub node: String,
}

#[derive(Debug, Serialize)]
struct Neighbour {
    id: String,
    title: String,
    is_completed: bool,
    /// Kind of the edge joining this neighbour to the shown step.
    kind: EdgeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl Neighbour {
    fn new(graph: &PlanGraph, node: &PlanNode, from: &str, to: &str) -> Self {
        let metadata = graph.get_edge(from, to).map(|edge| &edge.metadata);
        Self {
            id: node.id.clone(),
            title: node.title.clone(),
            is_completed: node.is_completed,
            kind: metadata.map_or(EdgeKind::Hard, EdgeMetadata::kind),
            reason: metadata.and_then(|m| m.reason.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ShowOutput {
    id: String,
    title: String,
    node_type: String,
    sort_index: i64,
    estimated_duration: u64,
    is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    is_blocked: bool,
    metadata: NodeMetadata,
    prerequisites: Vec<Neighbour>,
    dependents: Vec<Neighbour>,
}

impl ShowOutput {
    fn build(graph: &PlanGraph, id: &str) -> Option<Self> {
        let node = graph.get_node(id)?;
        Some(Self {
            id: node.id.clone(),
            title: node.title.clone(),
            node_type: node.node_type.to_string(),
            sort_index: node.sort_index,
            estimated_duration: node.estimated_duration,
            is_completed: node.is_completed,
            completed_at: node.completed_at,
            is_blocked: graph.is_node_blocked(id),
            metadata: node.metadata.clone(),
            prerequisites: graph
                .get_prerequisites(id)
                .into_iter()
                .map(|n| Neighbour::new(graph, n, &n.id, id))
                .collect(),
            dependents: graph
                .get_dependents(id)
                .into_iter()
                .map(|n| Neighbour::new(graph, n, id, &n.id))
                .collect(),
        })
    }
}

/// Execute `plg show`.
pub fn run_show(args: &ShowArgs, flat: bool, output: OutputMode) -> anyhow::Result<()> {
    let doc = Document::load(&args.file, flat)?;
    let Some(payload) = ShowOutput::build(doc.graph(), &args.node) else {
        return fail_with(
            output,
            &GraphError::InvalidNodeReference {
                id: args.node.clone(),
            },
        );
    };
    render(output, &payload, render_show_human)
}

fn render_show_human(payload: &ShowOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("{}  {}", payload.id, payload.title))?;
    pretty_kv(w, "Type", &payload.node_type)?;
    let state = match (payload.is_completed, payload.is_blocked) {
        (true, _) => "done",
        (false, true) => "blocked",
        (false, false) => "ready",
    };
    pretty_kv(w, "State", state)?;
    if let Some(at) = payload.completed_at {
        pretty_kv(w, "Completed", at.to_rfc3339())?;
    }
    pretty_kv(w, "Estimate", format!("{}s", payload.estimated_duration))?;
    if let Some(priority) = payload.metadata.priority {
        pretty_kv(w, "Priority", priority.to_string())?;
    }
    if let Some(due) = payload.metadata.due_by {
        pretty_kv(w, "Due", due.to_rfc3339())?;
    }
    if !payload.metadata.tags.is_empty() {
        pretty_kv(w, "Tags", payload.metadata.tags.join(", "))?;
    }
    if let Some(notes) = &payload.metadata.notes {
        pretty_kv(w, "Notes", notes)?;
    }

    for (heading, list) in [
        ("Waits on", &payload.prerequisites),
        ("Unblocks", &payload.dependents),
    ] {
        if list.is_empty() {
            continue;
        }
        writeln!(w, "{heading}:")?;
        for n in list {
            let check = if n.is_completed { "✓" } else { " " };
            write!(w, "  [{check}] {}  ({})", n.title, n.id)?;
            if n.kind == EdgeKind::Soft {
                write!(w, "  soft")?;
            }
            if let Some(reason) = &n.reason {
                write!(w, "  \"{reason}\"")?;
            }
            writeln!(w)?;
        }
    }
    Ok(())
}
