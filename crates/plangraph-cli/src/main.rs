#![forbid(unsafe_code)]

mod cmd;
mod output;
mod store;

use clap::{Parser, Subcommand};
use output::{OutputMode, resolve_output_mode, set_quiet};
use std::env;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "plg: inspect and edit plan dependency graphs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (defaults to pretty on a terminal, text when piped).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Alias for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Read (and write back) a flat `AssignmentPlan` instead of a graph document.
    #[arg(long, global = true)]
    flat: bool,

    /// Suppress confirmation lines and verbose logging. JSON output is unaffected.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "Check a plan for structural problems",
        long_about = "Report duplicate ids, orphan or duplicate dependencies, self-loops, and cycles. Exits non-zero if any are found.",
        after_help = "EXAMPLES:\n    # Check a graph document\n    plg validate plan.json\n\n    # Check a flat plan\n    plg validate --flat assignment.json --json"
    )]
    Validate(cmd::validate::ValidateArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show the first dependency cycle",
        after_help = "EXAMPLES:\n    plg cycles plan.json"
    )]
    Cycles(cmd::cycles::CyclesArgs),

    #[command(
        next_help_heading = "Read",
        about = "List steps in dependency order",
        long_about = "List steps so every prerequisite comes before the steps that wait on it. Ties go to the lower sort index.",
        after_help = "EXAMPLES:\n    # Work order\n    plg order plan.json\n\n    # Include completed steps\n    plg order plan.json --all"
    )]
    Order(cmd::order::OrderArgs),

    #[command(
        next_help_heading = "Read",
        about = "Group steps into parallel layers",
        after_help = "EXAMPLES:\n    plg layers plan.json --format text"
    )]
    Layers(cmd::order::LayersArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show progress and the critical path",
        after_help = "EXAMPLES:\n    plg stats plan.json\n\n    # Emit machine-readable output\n    plg stats plan.json --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Read",
        about = "List steps that can be started now",
        after_help = "EXAMPLES:\n    plg next plan.json -n 3"
    )]
    Next(cmd::next::NextArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one step with its prerequisites and dependents",
        after_help = "EXAMPLES:\n    plg show plan.json draft"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Read",
        about = "Export the plan as Graphviz",
        after_help = "EXAMPLES:\n    plg dot plan.json | dot -Tsvg > plan.svg"
    )]
    Dot(cmd::dot::DotArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Make one step wait on another",
        long_about = "Add a dependency FROM → TO. Rejected if it would create a self-loop, duplicate, or cycle; the file is left untouched in that case.",
        after_help = "EXAMPLES:\n    # Draft waits on outline\n    plg link plan.json outline draft\n\n    # Advisory dependency\n    plg link plan.json skim quiz --soft --reason \"helps but not required\""
    )]
    Link(cmd::link::LinkArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Remove a dependency",
        after_help = "EXAMPLES:\n    plg unlink plan.json outline draft"
    )]
    Unlink(cmd::link::UnlinkArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Mark a step completed",
        after_help = "EXAMPLES:\n    plg done plan.json outline\n\n    plg done plan.json outline --at 2025-03-01T09:00:00Z"
    )]
    Done(cmd::done::DoneArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Mark a step not completed",
        after_help = "EXAMPLES:\n    plg reopen plan.json outline"
    )]
    Reopen(cmd::done::ReopenArgs),

    #[command(
        next_help_heading = "Convert",
        about = "Convert a flat plan into a graph document",
        long_about = "Convert a flat AssignmentPlan into a graph document. Steps and prerequisites the graph rejects are skipped unless strict mode is on.",
        after_help = "EXAMPLES:\n    plg import assignment.json -o plan.json\n\n    # Refuse lossy conversions\n    plg import assignment.json -o plan.json --strict"
    )]
    Import(cmd::import::ImportArgs),

    #[command(
        next_help_heading = "Convert",
        about = "Write graph state back onto a flat plan",
        after_help = "EXAMPLES:\n    plg export plan.json --onto assignment.json"
    )]
    Export(cmd::import::ExportArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("PLANGRAPH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "plangraph=debug,info"
        } else {
            "plangraph=info,warn"
        })
    });

    let format = env::var("PLANGRAPH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose && !cli.quiet);

    let project_root = std::env::current_dir()?;
    let user_config = plangraph_core::config::load_user_config()?;
    let output = resolve_output_mode(cli.format, cli.json, user_config.output.as_deref());
    set_quiet(cli.quiet);
    let flat = cli.flat;
    debug!(?output, flat, quiet = cli.quiet, "resolved invocation");

    match cli.command {
        Commands::Validate(ref args) => cmd::validate::run_validate(args, flat, output),
        Commands::Cycles(ref args) => cmd::cycles::run_cycles(args, flat, output),
        Commands::Order(ref args) => cmd::order::run_order(args, flat, output, &project_root),
        Commands::Layers(ref args) => cmd::order::run_layers(args, flat, output, &project_root),
        Commands::Stats(ref args) => cmd::stats::run_stats(args, flat, output),
        Commands::Next(ref args) => cmd::next::run_next(args, flat, output),
        Commands::Show(ref args) => cmd::show::run_show(args, flat, output),
        Commands::Dot(ref args) => cmd::dot::run_dot(args, flat, output),
        Commands::Link(ref args) => cmd::link::run_link(args, flat, output),
        Commands::Unlink(ref args) => cmd::link::run_unlink(args, flat, output),
        Commands::Done(ref args) => cmd::done::run_done(args, flat, output),
        Commands::Reopen(ref args) => cmd::done::run_reopen(args, flat, output),
        Commands::Import(ref args) => cmd::import::run_import(args, output, &project_root),
        Commands::Export(ref args) => cmd::import::run_export(args, output),
    }
}
