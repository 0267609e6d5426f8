//! `plg link` / `plg unlink`: add or remove a dependency.

use std::path::PathBuf;

use clap::Args;
use plangraph_core::{EdgeKind, EdgeMetadata};
use serde::Serialize;
use tracing::info;

use crate::output::{CliError, OutputMode, fail_with, render_error, render_success};
use crate::store::Document;

/// Arguments for `plg link`.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Plan document to edit.
    pub file: PathBuf,

    /// Prerequisite step id.
    pub from: String,

    /// Dependent step id (waits on FROM).
    pub to: String,

    /// Record the dependency as advisory rather than gating.
    #[arg(long)]
    pub soft: bool,

    /// Why TO waits on FROM.
    #[arg(long)]
    pub reason: Option<String>,
}

/// Arguments for `plg unlink`.
#[derive(Args, Debug)]
pub struct UnlinkArgs {
    /// Plan document to edit.
    pub file: PathBuf,

    /// Prerequisite step id.
    pub from: String,

    /// Dependent step id.
    pub to: String,
}

#[derive(Debug, Serialize)]
struct LinkOutput {
    from: String,
    to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<EdgeKind>,
    changed: bool,
    version: u64,
}

/// Execute `plg link`. The document is only rewritten if the edge is accepted.
pub fn run_link(args: &LinkArgs, flat: bool, output: OutputMode) -> anyhow::Result<()> {
    // Flat plans store bare prerequisite ids; edge metadata has nowhere to go.
    if flat && (args.soft || args.reason.is_some()) {
        render_error(
            output,
            &CliError::with_details(
                "--soft and --reason cannot be stored in a flat plan",
                format!(
                    "drop --soft/--reason, or `plg import {}` and link in the graph document",
                    args.file.display()
                ),
                "flat_edge_metadata",
            ),
        )?;
        anyhow::bail!("edge metadata not supported with --flat");
    }

    let mut doc = Document::load(&args.file, flat)?;
    doc.ensure_writable(&args.file, output)?;

    let mut metadata = if args.soft {
        EdgeMetadata::soft()
    } else {
        EdgeMetadata::default()
    };
    metadata.reason.clone_from(&args.reason);
    let kind = metadata.kind();

    if let Err(err) = doc.graph_mut().add_edge_with(&args.from, &args.to, metadata) {
        return fail_with(output, &err);
    }
    doc.save(&args.file)?;
    info!(from = %args.from, to = %args.to, %kind, "dependency added");

    let payload = LinkOutput {
        from: args.from.clone(),
        to: args.to.clone(),
        kind: Some(kind),
        changed: true,
        version: doc.graph().metadata.version,
    };
    render_success(
        output,
        &payload,
        &format!("{} now waits on {} ({kind})", args.to, args.from),
    )
}

/// Execute `plg unlink`. Fails if no such dependency exists.
pub fn run_unlink(args: &UnlinkArgs, flat: bool, output: OutputMode) -> anyhow::Result<()> {
    let mut doc = Document::load(&args.file, flat)?;
    doc.ensure_writable(&args.file, output)?;

    if !doc.graph_mut().remove_edge(&args.from, &args.to) {
        render_error(
            output,
            &CliError::with_details(
                format!("no dependency {} → {}", args.from, args.to),
                format!("run `plg show {} {}` to list its dependencies", args.file.display(), args.to),
                "edge_not_found",
            ),
        )?;
        anyhow::bail!("dependency not found");
    }
    doc.save(&args.file)?;
    info!(from = %args.from, to = %args.to, "dependency removed");

    let payload = LinkOutput {
        from: args.from.clone(),
        to: args.to.clone(),
        kind: None,
        changed: true,
        version: doc.graph().metadata.version,
    };
    render_success(
        output,
        &payload,
        &format!("{} no longer waits on {}", args.to, args.from),
    )
}
