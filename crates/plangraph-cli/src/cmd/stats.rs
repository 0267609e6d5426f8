//! `plg stats`: progress and critical-path summary.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use plangraph_core::GraphStatistics;
use serde::Serialize;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use crate::store::Document;

/// Arguments for `plg stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Plan document to summarize.
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct PathStep {
    id: String,
    title: String,
    estimated_duration: u64,
}

/// Report payload for `plg stats`.
#[derive(Debug, Serialize)]
struct StatsReport {
    name: String,
    version: u64,
    statistics: GraphStatistics,
    critical_path: Vec<PathStep>,
}

/// Execute `plg stats`.
pub fn run_stats(args: &StatsArgs, flat: bool, output: OutputMode) -> anyhow::Result<()> {
    let doc = Document::load(&args.file, flat)?;
    let graph = doc.graph();

    let report = StatsReport {
        name: graph.metadata.name.clone(),
        version: graph.metadata.version,
        statistics: graph.get_statistics(),
        critical_path: graph
            .critical_path()
            .into_iter()
            .map(|node| PathStep {
                id: node.id.clone(),
                title: node.title.clone(),
                estimated_duration: node.estimated_duration,
            })
            .collect(),
    };

    render_mode(output, &report, render_stats_text, render_stats_pretty)
}

/// `1h 30m`, `45m`, or `0m`.
fn format_duration(seconds: u64) -> String {
    let minutes = seconds / 60;
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

fn render_stats_text(report: &StatsReport, w: &mut dyn Write) -> std::io::Result<()> {
    let s = &report.statistics;
    writeln!(
        w,
        "nodes={} completed={} blocked={} edges={} roots={} leaves={} longest_path={} remaining={}s",
        s.total_nodes,
        s.completed_nodes,
        s.blocked_nodes,
        s.total_edges,
        s.root_node_count,
        s.leaf_node_count,
        s.longest_path,
        s.remaining_duration,
    )?;
    let ids: Vec<&str> = report.critical_path.iter().map(|p| p.id.as_str()).collect();
    writeln!(w, "critical_path={}", ids.join(","))
}

fn render_stats_pretty(report: &StatsReport, w: &mut dyn Write) -> std::io::Result<()> {
    let s = &report.statistics;
    pretty_section(w, &format!("{} (v{})", report.name, report.version))?;
    pretty_kv(
        w,
        "Progress",
        format!(
            "{}/{} steps ({:.0}%)",
            s.completed_nodes, s.total_nodes, s.completion_percentage
        ),
    )?;
    pretty_kv(w, "Blocked", s.blocked_nodes.to_string())?;
    pretty_kv(w, "Dependencies", s.total_edges.to_string())?;
    pretty_kv(
        w,
        "Roots/leaves",
        format!("{} / {}", s.root_node_count, s.leaf_node_count),
    )?;
    pretty_kv(w, "Isolated", s.isolated_node_count.to_string())?;
    pretty_kv(w, "Density", format!("{:.3}", s.density))?;
    pretty_kv(
        w,
        "Effort",
        format!(
            "{} total, {} remaining",
            format_duration(s.estimated_total_duration),
            format_duration(s.remaining_duration)
        ),
    )?;
    pretty_kv(w, "Longest path", format!("{} hops", s.longest_path))?;

    if report.critical_path.len() > 1 {
        writeln!(w)?;
        pretty_section(w, "Critical path")?;
        for (idx, step) in report.critical_path.iter().enumerate() {
            writeln!(
                w,
                "{:>3}. {}  ({}, {})",
                idx + 1,
                step.title,
                step.id,
                format_duration(step.estimated_duration)
            )?;
        }
    }
    Ok(())
}
