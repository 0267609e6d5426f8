//! `plg order` and `plg layers`: dependency-respecting work order.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use plangraph_core::config::load_project_config;
use plangraph_core::{GraphError, PlanGraph, PlanNode};
use serde::Serialize;

use crate::output::{OutputMode, fail_with, render_mode};
use crate::store::Document;

/// Arguments for `plg order`.
#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Plan document to sort.
    pub file: PathBuf,

    /// Include completed steps even if the project config hides them.
    #[arg(long)]
    pub all: bool,
}

/// Arguments for `plg layers`.
#[derive(Args, Debug)]
pub struct LayersArgs {
    /// Plan document to layer.
    pub file: PathBuf,

    /// Include completed steps even if the project config hides them.
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Serialize)]
struct OrderedStep {
    position: usize,
    id: String,
    title: String,
    sort_index: i64,
    is_completed: bool,
    is_blocked: bool,
}

#[derive(Debug, Serialize)]
struct OrderOutput {
    steps: Vec<OrderedStep>,
}

#[derive(Debug, Serialize)]
struct LayersOutput {
    layers: Vec<Layer>,
}

#[derive(Debug, Serialize)]
struct Layer {
    depth: usize,
    steps: Vec<OrderedStep>,
}

fn ordered_step(graph: &PlanGraph, position: usize, node: &PlanNode) -> OrderedStep {
    OrderedStep {
        position,
        id: node.id.clone(),
        title: node.title.clone(),
        sort_index: node.sort_index,
        is_completed: node.is_completed,
        is_blocked: graph.is_node_blocked(&node.id),
    }
}

fn show_completed(project_root: &Path, all: bool) -> anyhow::Result<bool> {
    Ok(all || load_project_config(project_root)?.display.show_completed)
}

/// Fail with the cycle that prevents ordering.
fn fail_cyclic(graph: &PlanGraph, output: OutputMode) -> anyhow::Result<()> {
    match graph.detect_cycle() {
        Some(path) => fail_with(output, &GraphError::CycleDetected { path }),
        None => anyhow::bail!("graph could not be ordered"),
    }
}

/// Execute `plg order`.
pub fn run_order(
    args: &OrderArgs,
    flat: bool,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let doc = Document::load(&args.file, flat)?;
    let graph = doc.graph();
    let Some(order) = graph.topological_sort() else {
        return fail_cyclic(graph, output);
    };

    let include_completed = show_completed(project_root, args.all)?;
    let steps: Vec<OrderedStep> = order
        .into_iter()
        .enumerate()
        .filter(|(_, node)| include_completed || !node.is_completed)
        .map(|(idx, node)| ordered_step(graph, idx + 1, node))
        .collect();

    render_mode(
        output,
        &OrderOutput { steps },
        render_order_text,
        render_order_pretty,
    )
}

/// Execute `plg layers`.
pub fn run_layers(
    args: &LayersArgs,
    flat: bool,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let doc = Document::load(&args.file, flat)?;
    let graph = doc.graph();
    let Some(raw_layers) = graph.topological_layers() else {
        return fail_cyclic(graph, output);
    };

    let include_completed = show_completed(project_root, args.all)?;
    let mut position = 0;
    let layers: Vec<Layer> = raw_layers
        .into_iter()
        .enumerate()
        .map(|(depth, nodes)| Layer {
            depth,
            steps: nodes
                .into_iter()
                .filter(|node| include_completed || !node.is_completed)
                .map(|node| {
                    position += 1;
                    ordered_step(graph, position, node)
                })
                .collect(),
        })
        .collect();

    render_mode(
        output,
        &LayersOutput { layers },
        render_layers_text,
        render_layers_pretty,
    )
}

fn status_marker(step: &OrderedStep) -> &'static str {
    if step.is_completed {
        "done"
    } else if step.is_blocked {
        "blocked"
    } else {
        "ready"
    }
}

fn render_order_text(payload: &OrderOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for step in &payload.steps {
        writeln!(w, "{}\t{}\t{}", step.id, status_marker(step), step.title)?;
    }
    Ok(())
}

fn render_order_pretty(payload: &OrderOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if payload.steps.is_empty() {
        return writeln!(w, "Nothing to order.");
    }
    for step in &payload.steps {
        let check = if step.is_completed { "✓" } else { " " };
        writeln!(w, "{:>3}. [{check}] {}  ({})", step.position, step.title, step.id)?;
    }
    Ok(())
}

fn render_layers_text(payload: &LayersOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for layer in &payload.layers {
        let ids: Vec<&str> = layer.steps.iter().map(|s| s.id.as_str()).collect();
        writeln!(w, "{}\t{}", layer.depth, ids.join(" "))?;
    }
    Ok(())
}

fn render_layers_pretty(payload: &LayersOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if payload.layers.is_empty() {
        return writeln!(w, "Nothing to order.");
    }
    for layer in &payload.layers {
        writeln!(w, "Layer {}", layer.depth)?;
        for step in &layer.steps {
            writeln!(w, "  - {}  ({}, {})", step.title, step.id, status_marker(step))?;
        }
    }
    Ok(())
}
