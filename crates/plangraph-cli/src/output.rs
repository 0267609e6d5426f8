//! Shared output layer for pretty/text/JSON parity across all commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact text for scripts and
//! agents, or stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / hidden `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. `output` in the user config file
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use plangraph_core::GraphError;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// Set once from `-q/--quiet` before any command runs.
static QUIET: AtomicBool = AtomicBool::new(false);

/// Suppress human confirmation lines for the rest of the process.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<14} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, visual framing).
    Pretty,
    /// Token-efficient plain text for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Returns `true` if pretty output was requested.
    pub const fn is_pretty(self) -> bool {
        matches!(self, Self::Pretty)
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Text => "text",
            Self::Json => "json",
        }
    }

    fn from_resolved(mode: &str) -> Self {
        match mode {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::Text,
        }
    }
}

/// Core resolution logic, separated from I/O for testability.
///
/// `format_flag`: explicit `--format` value if provided.
/// `json_flag`: hidden `--json` alias.
/// `format_env`: the value of `FORMAT` if set.
/// `user_output`: `output` from the user config file.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    user_output: Option<&str>,
) -> OutputMode {
    let flag = format_flag
        .or(json_flag.then_some(OutputMode::Json))
        .map(OutputMode::as_str);
    OutputMode::from_resolved(&plangraph_core::config::resolve_output(
        flag,
        user_output,
        format_env,
    ))
}

/// Resolve the output mode from CLI flags, environment, user config, and
/// TTY defaults.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    user_output: Option<&str>,
) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    resolve_output_mode_inner(format_flag, json_flag, env_val.as_deref(), user_output)
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "cycle_detected", "node_not_found").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Create an error with a suggestion and error code.
    pub fn with_details(
        message: impl Into<String>,
        suggestion: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            suggestion: Some(suggestion.into()),
            error_code: Some(error_code.into()),
        }
    }
}

/// Convert a [`GraphError`] into a [`CliError`].
impl From<&GraphError> for CliError {
    fn from(err: &GraphError) -> Self {
        Self {
            message: err.to_string(),
            suggestion: err.hint().map(str::to_string),
            error_code: Some(err.kind().to_string()),
        }
    }
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode, the value is serialized with `serde_json`. In pretty/text
/// mode, the provided `human_fn` closure is called to produce text output.
/// For distinct text/pretty rendering, use [`render_mode`].
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            human_fn(value, &mut out)?;
        }
    }
    Ok(())
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(mode, error, &mut out)?;
    Ok(())
}

fn write_error(mode: OutputMode, error: &CliError, out: &mut dyn Write) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// Render a graph error to stderr and turn it into a failing result.
pub fn fail_with(mode: OutputMode, err: &GraphError) -> anyhow::Result<()> {
    render_error(mode, &CliError::from(err))?;
    anyhow::bail!("{err}")
}

/// Render a short confirmation to stdout.
///
/// JSON output is always written; the pretty/text line is dropped under
/// `--quiet`.
pub fn render_success<T: Serialize>(
    mode: OutputMode,
    value: &T,
    message: &str,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_success(mode, value, message, QUIET.load(Ordering::Relaxed), &mut out)
}

fn write_success<T: Serialize>(
    mode: OutputMode,
    value: &T,
    message: &str,
    quiet: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text if !quiet => writeln!(out, "✓ {message}")?,
        OutputMode::Pretty | OutputMode::Text => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plangraph_core::{CyclePath, PlanEdge};

    // ── OutputMode ──────────────────────────────────────────────────────────

    #[test]
    fn output_mode_predicates() {
        assert!(OutputMode::Json.is_json());
        assert!(!OutputMode::Pretty.is_json());
        assert!(OutputMode::Pretty.is_pretty());
        assert!(!OutputMode::Text.is_pretty());
    }

    // ── resolve_output_mode_inner (testable pure function) ──────────────────

    #[test]
    fn resolve_format_flag_wins_over_json_and_env() {
        let mode = resolve_output_mode_inner(Some(OutputMode::Text), true, Some("pretty"), None);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn resolve_json_flag_wins_over_env() {
        let mode = resolve_output_mode_inner(None, true, Some("pretty"), Some("text"));
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn resolve_format_env_wins_over_user_config() {
        let mode = resolve_output_mode_inner(None, false, Some("json"), Some("pretty"));
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn resolve_user_config_used_without_env() {
        let mode = resolve_output_mode_inner(None, false, None, Some("json"));
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn resolve_format_env_case_insensitive() {
        let mode = resolve_output_mode_inner(None, false, Some("TEXT"), None);
        assert_eq!(mode, OutputMode::Text);
    }

    // ── CliError ────────────────────────────────────────────────────────────

    #[test]
    fn graph_error_maps_to_cli_error() {
        let err = GraphError::DuplicateEdge {
            edge: PlanEdge::new("a", "b"),
        };
        let cli = CliError::from(&err);
        assert_eq!(cli.message, "duplicate edge a → b");
        assert_eq!(cli.error_code.as_deref(), Some("duplicate_edge"));
        assert!(cli.suggestion.is_some());
    }

    #[test]
    fn error_json_is_wrapped() {
        let err = GraphError::CycleDetected {
            path: CyclePath::new(vec!["a".into(), "b".into(), "a".into()]),
        };
        let mut out = Vec::new();
        write_error(OutputMode::Json, &CliError::from(&err), &mut out).expect("render");
        let json: serde_json::Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(json["error"]["error_code"], "cycle_detected");
    }

    #[test]
    fn error_text_includes_suggestion() {
        let cli = CliError::with_details("node 'x' not found", "check the id", "node_not_found");
        let mut out = Vec::new();
        write_error(OutputMode::Text, &cli, &mut out).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.starts_with("error: node 'x' not found"));
        assert!(text.contains("suggestion: check the id"));
    }

    // ── render_success ──────────────────────────────────────────────────────

    #[test]
    fn success_line_is_dropped_when_quiet() {
        let value = serde_json::json!({ "changed": true });
        for mode in [OutputMode::Text, OutputMode::Pretty] {
            let mut out = Vec::new();
            write_success(mode, &value, "a done", false, &mut out).expect("render");
            assert_eq!(String::from_utf8(out).expect("utf8"), "✓ a done\n");

            let mut out = Vec::new();
            write_success(mode, &value, "a done", true, &mut out).expect("render");
            assert!(out.is_empty());
        }
    }

    #[test]
    fn quiet_keeps_json_payload() {
        let value = serde_json::json!({ "changed": true });
        let mut out = Vec::new();
        write_success(OutputMode::Json, &value, "a done", true, &mut out).expect("render");
        let json: serde_json::Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(json["changed"], true);
    }
}
