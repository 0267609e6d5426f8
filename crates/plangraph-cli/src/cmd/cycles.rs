//! `plg cycles`: report the first dependency cycle, if any.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use plangraph_core::{CyclePath, PlanGraph};
use serde::Serialize;

use crate::output::{OutputMode, render};
use crate::store::Document;

/// Arguments for `plg cycles`.
#[derive(Args, Debug)]
pub struct CyclesArgs {
    /// Plan document to inspect.
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct CycleStep {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

#[derive(Debug, Serialize)]
struct CyclesOutput {
    has_cycle: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    cycle: Option<CyclePath>,
    steps: Vec<CycleStep>,
}

impl CyclesOutput {
    fn from_graph(graph: &PlanGraph) -> Self {
        let cycle = graph.detect_cycle();
        let steps = cycle
            .as_ref()
            .map(|path| {
                path.ids()
                    .iter()
                    .take(path.len())
                    .map(|id| CycleStep {
                        id: id.clone(),
                        title: graph.get_node(id).map(|node| node.title.clone()),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            has_cycle: cycle.is_some(),
            cycle,
            steps,
        }
    }
}

/// Execute `plg cycles`. Reporting a cycle is not a failure.
pub fn run_cycles(args: &CyclesArgs, flat: bool, output: OutputMode) -> anyhow::Result<()> {
    let doc = Document::load(&args.file, flat)?;
    let payload = CyclesOutput::from_graph(doc.graph());
    render(output, &payload, render_cycles_human)
}

fn render_cycles_human(payload: &CyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let Some(cycle) = &payload.cycle else {
        return writeln!(w, "No dependency cycles found.");
    };

    writeln!(w, "Dependency cycle: {cycle}")?;
    for step in &payload.steps {
        match &step.title {
            Some(title) => writeln!(w, "  - {} — {title}", step.id)?,
            None => writeln!(w, "  - {}", step.id)?,
        }
    }
    Ok(())
}
