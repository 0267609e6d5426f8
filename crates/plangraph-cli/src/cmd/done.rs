//! `plg done` / `plg reopen`: toggle completion of a step.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use plangraph_core::GraphError;
use serde::Serialize;
use tracing::info;

use crate::output::{OutputMode, fail_with, render_success};
use crate::store::Document;

/// Arguments for `plg done`.
#[derive(Args, Debug)]
pub struct DoneArgs {
    /// Plan document to edit.
    pub file: PathBuf,

    /// Step id.
    pub node: String,

    /// Completion time (RFC 3339). Defaults to now.
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

/// Arguments for `plg reopen`.
#[derive(Args, Debug)]
pub struct ReopenArgs {
    /// Plan document to edit.
    pub file: PathBuf,

    /// Step id.
    pub node: String,
}

#[derive(Debug, Serialize)]
struct CompletionOutput {
    id: String,
    is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    changed: bool,
    /// Steps that became startable because of this change.
    unblocked: Vec<String>,
    version: u64,
}

/// Execute `plg done`.
pub fn run_done(args: &DoneArgs, flat: bool, output: OutputMode) -> anyhow::Result<()> {
    let mut doc = Document::load(&args.file, flat)?;
    doc.ensure_writable(&args.file, output)?;
    if !doc.graph().contains_node(&args.node) {
        return fail_with(
            output,
            &GraphError::InvalidNodeReference {
                id: args.node.clone(),
            },
        );
    }

    let blocked_before: Vec<String> = doc
        .graph()
        .get_dependents(&args.node)
        .into_iter()
        .filter(|n| doc.graph().is_node_blocked(&n.id))
        .map(|n| n.id.clone())
        .collect();

    let at = args.at.unwrap_or_else(Utc::now);
    let changed = doc.graph_mut().mark_node_completed(&args.node, at);
    if changed {
        doc.save(&args.file)?;
        info!(node = %args.node, "step completed");
    }

    let graph = doc.graph();
    let unblocked = blocked_before
        .into_iter()
        .filter(|id| !graph.is_node_blocked(id))
        .collect();
    let payload = CompletionOutput {
        id: args.node.clone(),
        is_completed: true,
        completed_at: graph.get_node(&args.node).and_then(|n| n.completed_at),
        changed,
        unblocked,
        version: graph.metadata.version,
    };
    let message = if payload.unblocked.is_empty() {
        format!("{} done", args.node)
    } else {
        format!("{} done; unblocked {}", args.node, payload.unblocked.join(", "))
    };
    render_success(output, &payload, &message)
}

/// Execute `plg reopen`.
pub fn run_reopen(args: &ReopenArgs, flat: bool, output: OutputMode) -> anyhow::Result<()> {
    let mut doc = Document::load(&args.file, flat)?;
    doc.ensure_writable(&args.file, output)?;
    if !doc.graph().contains_node(&args.node) {
        return fail_with(
            output,
            &GraphError::InvalidNodeReference {
                id: args.node.clone(),
            },
        );
    }

    let changed = doc.graph_mut().mark_node_incomplete(&args.node);
    if changed {
        doc.save(&args.file)?;
        info!(node = %args.node, "step reopened");
    }

    let payload = CompletionOutput {
        id: args.node.clone(),
        is_completed: false,
        completed_at: None,
        changed,
        unblocked: Vec::new(),
        version: doc.graph().metadata.version,
    };
    render_success(output, &payload, &format!("{} reopened", args.node))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_args_parse_timestamp() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: DoneArgs,
        }

        let parsed =
            Wrapper::parse_from(["test", "plan.json", "draft", "--at", "2025-03-01T09:00:00Z"]);
        assert_eq!(parsed.args.node, "draft");
        assert_eq!(
            parsed.args.at.map(|t| t.to_rfc3339()),
            Some("2025-03-01T09:00:00+00:00".to_string())
        );
    }
}
