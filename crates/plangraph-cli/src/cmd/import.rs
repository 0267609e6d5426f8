//! `plg import` / `plg export`: move between flat plans and graph documents.

use std::path::{Path, PathBuf};

use clap::Args;
use plangraph_core::config::load_project_config;
use plangraph_core::{AssignmentPlan, PlanGraph};
use serde::Serialize;
use tracing::{info, warn};

use crate::output::{CliError, OutputMode, render_error, render_success};
use crate::store::{ImportReport, read_json, write_json};

/// Arguments for `plg import`.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Flat plan (`AssignmentPlan` JSON) to convert.
    pub flat_file: PathBuf,

    /// Where to write the graph document.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Fail if any step or prerequisite had to be dropped.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `plg export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Graph document to export.
    pub graph_file: PathBuf,

    /// Flat plan to update with the graph's state.
    #[arg(long)]
    pub onto: PathBuf,

    /// Write the updated flat plan here instead of overwriting `--onto`.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute `plg import`.
///
/// Strict mode comes from `--strict` or `[import] strict` in the project
/// config. A strict import that loses anything writes nothing.
pub fn run_import(
    args: &ImportArgs,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let strict = args.strict || load_project_config(project_root)?.import.strict;
    let plan: AssignmentPlan = read_json(&args.flat_file)?;
    let graph = PlanGraph::from_flat_plan(&plan);
    let report = ImportReport::new(&plan, &graph);

    if !report.is_lossless() {
        warn!(
            dropped_steps = report.dropped_steps,
            dropped_prerequisites = report.dropped_prerequisites,
            "flat plan import was lossy"
        );
        if strict {
            render_error(
                output,
                &CliError::with_details(
                    format!(
                        "import dropped {} step(s) and {} prerequisite(s)",
                        report.dropped_steps, report.dropped_prerequisites
                    ),
                    "fix duplicate ids, unknown or circular prerequisites, or import without --strict",
                    "lossy_import",
                ),
            )?;
            anyhow::bail!("strict import failed");
        }
    }

    write_json(&args.output, &graph)?;
    info!(path = %args.output.display(), nodes = report.nodes, "graph written");

    render_success(
        output,
        &report,
        &format!(
            "imported {} step(s), {} dependencies → {}",
            report.nodes,
            report.edges,
            args.output.display()
        ),
    )
}

#[derive(Debug, Serialize)]
struct ExportReport {
    updated_steps: usize,
    version: u64,
    path: String,
}

/// Execute `plg export`.
pub fn run_export(args: &ExportArgs, output: OutputMode) -> anyhow::Result<()> {
    let graph: PlanGraph = read_json(&args.graph_file)?;
    let plan: AssignmentPlan = read_json(&args.onto)?;

    let updated = graph.to_flat_plan(&plan);
    let target = args.output.as_ref().unwrap_or(&args.onto);
    write_json(target, &updated)?;

    let report = ExportReport {
        updated_steps: plan
            .steps
            .iter()
            .zip(&updated.steps)
            .filter(|(before, after)| before != after)
            .count(),
        version: updated.version,
        path: target.display().to_string(),
    };
    render_success(
        output,
        &report,
        &format!(
            "updated {} step(s) in {} (v{})",
            report.updated_steps, report.path, report.version
        ),
    )
}
