//! Reading and writing plan documents.
//!
//! A command works on one file, either a graph document (`PlanGraph` JSON)
//! or, with `--flat`, a flat plan (`AssignmentPlan` JSON) that is converted
//! to a graph on load and written back through `to_flat_plan` on save.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use plangraph_core::{AssignmentPlan, PlanGraph};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::output::{CliError, OutputMode, render_error};

/// What a flat-plan conversion kept and dropped.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub steps: usize,
    pub nodes: usize,
    pub prerequisites: usize,
    pub edges: usize,
    pub dropped_steps: usize,
    pub dropped_prerequisites: usize,
    pub violations: usize,
}

impl ImportReport {
    pub fn new(plan: &AssignmentPlan, graph: &PlanGraph) -> Self {
        let prerequisites: usize = plan.steps.iter().map(|s| s.prerequisite_ids.len()).sum();
        Self {
            steps: plan.steps.len(),
            nodes: graph.node_count(),
            prerequisites,
            edges: graph.edge_count(),
            dropped_steps: plan.steps.len().saturating_sub(graph.node_count()),
            dropped_prerequisites: prerequisites - graph.edge_count().min(prerequisites),
            violations: graph.validate().len(),
        }
    }

    pub const fn is_lossless(&self) -> bool {
        self.dropped_steps == 0 && self.dropped_prerequisites == 0 && self.violations == 0
    }
}

/// A loaded document plus the graph view commands operate on.
#[derive(Debug)]
pub enum Document {
    Graph(PlanGraph),
    /// `report` describes the conversion at load time, before any edit.
    Flat {
        plan: AssignmentPlan,
        graph: PlanGraph,
        report: ImportReport,
    },
}

impl Document {
    /// Load `path` as a graph document, or as a flat plan if `flat` is set.
    pub fn load(path: &Path, flat: bool) -> Result<Self> {
        if flat {
            let plan: AssignmentPlan = read_json(path)?;
            let graph = PlanGraph::from_flat_plan(&plan);
            let report = ImportReport::new(&plan, &graph);
            if !report.is_lossless() {
                warn!(
                    path = %path.display(),
                    dropped_steps = report.dropped_steps,
                    dropped_prerequisites = report.dropped_prerequisites,
                    "flat plan loaded lossily; it is read-only"
                );
            }
            Ok(Self::Flat {
                plan,
                graph,
                report,
            })
        } else {
            Ok(Self::Graph(read_json(path)?))
        }
    }

    pub const fn graph(&self) -> &PlanGraph {
        match self {
            Self::Graph(graph) | Self::Flat { graph, .. } => graph,
        }
    }

    pub fn graph_mut(&mut self) -> &mut PlanGraph {
        match self {
            Self::Graph(graph) | Self::Flat { graph, .. } => graph,
        }
    }

    /// Fail unless saving would preserve everything the file holds.
    ///
    /// A flat plan whose conversion dropped steps or prerequisites would
    /// lose them on write-back, so edit commands call this before mutating.
    pub fn ensure_writable(&self, path: &Path, output: OutputMode) -> Result<()> {
        let Self::Flat { report, .. } = self else {
            return Ok(());
        };
        if report.is_lossless() {
            return Ok(());
        }
        render_error(
            output,
            &CliError::with_details(
                format!(
                    "{} drops {} step(s) and {} prerequisite(s) when loaded; saving would erase them",
                    path.display(),
                    report.dropped_steps,
                    report.dropped_prerequisites
                ),
                "run `plg validate --flat` and fix the plan, or `plg import` it and edit the graph",
                "lossy_flat_document",
            ),
        )?;
        anyhow::bail!("refusing to rewrite lossy flat plan {}", path.display())
    }

    /// Write the document back in the format it was loaded from.
    pub fn save(&self, path: &Path) -> Result<()> {
        match self {
            Self::Graph(graph) => write_json(path, graph),
            Self::Flat {
                plan,
                graph,
                report,
            } => {
                if !report.is_lossless() {
                    anyhow::bail!("refusing to rewrite lossy flat plan {}", path.display());
                }
                write_json(path, &graph.to_flat_plan(plan))
            }
        }
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write pretty JSON via a sibling temp file and rename, so a failed write
/// never leaves a truncated document behind.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut body = serde_json::to_string_pretty(value).context("Failed to serialize document")?;
    body.push('\n');

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    debug!(path = %path.display(), "document written");
    Ok(())
}
