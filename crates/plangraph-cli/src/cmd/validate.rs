//! `plg validate`: audit a plan against every structural invariant.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use plangraph_core::GraphError;
use serde::Serialize;

use crate::output::{OutputMode, pretty_section, render_mode};
use crate::store::Document;

/// Arguments for `plg validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Plan document to check.
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct Violation {
    code: &'static str,
    kind: &'static str,
    title: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'static str>,
}

impl From<&GraphError> for Violation {
    fn from(err: &GraphError) -> Self {
        Self {
            code: err.code(),
            kind: err.kind(),
            title: err.message(),
            message: err.to_string(),
            hint: err.hint(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ValidateReport {
    valid: bool,
    nodes: usize,
    edges: usize,
    violations: Vec<Violation>,
}

/// Execute `plg validate`. Fails if any violation is found.
pub fn run_validate(args: &ValidateArgs, flat: bool, output: OutputMode) -> anyhow::Result<()> {
    let doc = Document::load(&args.file, flat)?;
    let graph = doc.graph();
    let violations: Vec<Violation> = graph.validate().iter().map(Violation::from).collect();

    let report = ValidateReport {
        valid: violations.is_empty(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        violations,
    };

    render_mode(output, &report, render_text, render_pretty)?;

    if !report.valid {
        anyhow::bail!(
            "{} has {} violation(s)",
            args.file.display(),
            report.violations.len()
        );
    }
    Ok(())
}

fn render_text(report: &ValidateReport, w: &mut dyn Write) -> std::io::Result<()> {
    if report.valid {
        return writeln!(w, "ok  nodes={}  edges={}", report.nodes, report.edges);
    }
    for v in &report.violations {
        writeln!(w, "{}  {}  {}", v.code, v.kind, v.message)?;
    }
    Ok(())
}

fn render_pretty(report: &ValidateReport, w: &mut dyn Write) -> std::io::Result<()> {
    if report.valid {
        return writeln!(
            w,
            "✓ Plan is valid ({} nodes, {} edges)",
            report.nodes, report.edges
        );
    }

    pretty_section(w, &format!("Violations ({})", report.violations.len()))?;
    for v in &report.violations {
        writeln!(w, "[{}] {}: {}", v.code, v.title, v.message)?;
        if let Some(hint) = v.hint {
            writeln!(w, "        {hint}")?;
        }
    }
    Ok(())
}
