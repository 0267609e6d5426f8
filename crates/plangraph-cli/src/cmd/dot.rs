//! `plg dot`: Graphviz export.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::output::{OutputMode, render};
use crate::store::Document;

/// Arguments for `plg dot`.
#[derive(Args, Debug)]
pub struct DotArgs {
    /// Plan document to export.
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct DotOutput {
    content_hash: String,
    dot: String,
}

/// Execute `plg dot`. Pipe the text output into `dot -Tsvg`.
pub fn run_dot(args: &DotArgs, flat: bool, output: OutputMode) -> anyhow::Result<()> {
    let doc = Document::load(&args.file, flat)?;
    let graph = doc.graph();
    let payload = DotOutput {
        content_hash: graph.content_hash(),
        dot: graph.to_dot(),
    };
    render(output, &payload, |p, w| write!(w, "{}", p.dot))
}
