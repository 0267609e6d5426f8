//! `plg next`: steps that can be started now.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::output::{OutputMode, render_mode};
use crate::store::Document;

/// Arguments for `plg next`.
#[derive(Args, Debug)]
pub struct NextArgs {
    /// Plan document to inspect.
    pub file: PathBuf,

    /// Show at most this many steps.
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct NextStep {
    id: String,
    title: String,
    node_type: String,
    estimated_duration: u64,
}

#[derive(Debug, Serialize)]
struct NextOutput {
    available: Vec<NextStep>,
}

/// Execute `plg next`.
pub fn run_next(args: &NextArgs, flat: bool, output: OutputMode) -> anyhow::Result<()> {
    let doc = Document::load(&args.file, flat)?;
    let available = doc
        .graph()
        .get_available_nodes()
        .into_iter()
        .take(args.limit.unwrap_or(usize::MAX))
        .map(|node| NextStep {
            id: node.id.clone(),
            title: node.title.clone(),
            node_type: node.node_type.to_string(),
            estimated_duration: node.estimated_duration,
        })
        .collect();

    render_mode(output, &NextOutput { available }, render_text, render_pretty)
}

fn render_text(payload: &NextOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for step in &payload.available {
        writeln!(w, "{}\t{}", step.id, step.title)?;
    }
    Ok(())
}

fn render_pretty(payload: &NextOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if payload.available.is_empty() {
        return writeln!(w, "Nothing is ready to start.");
    }
    writeln!(w, "Ready to start ({}):", payload.available.len())?;
    for step in &payload.available {
        writeln!(w, "  → {}  ({}, {})", step.title, step.id, step.node_type)?;
    }
    Ok(())
}
