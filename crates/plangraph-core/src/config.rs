//! Project and user configuration.
//!
//! - Project: `<root>/.plangraph/config.toml`
//! - User: `<config_dir>/plangraph/config.toml`
//!
//! Missing files resolve to defaults; unreadable or malformed files are
//! errors.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::io::IsTerminal;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Fail a flat-plan import if the converted graph has any violation
    /// or any step or prerequisite was dropped.
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub show_completed: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_completed: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    load_toml_or_default(&project_root.join(".plangraph/config.toml"))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };
    load_toml_or_default(&config_dir.join("plangraph/config.toml"))
}

fn load_toml_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<T>(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Flag, then `FORMAT`, then user config, then TTY detection.
///
/// Unrecognized values at any layer are skipped.
pub fn resolve_output(
    cli_output: Option<&str>,
    user_output: Option<&str>,
    env_format: Option<&str>,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "plain" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    [cli_output, env_format, user_output]
        .into_iter()
        .flatten()
        .find_map(normalize_output_mode)
        .map_or_else(
            || {
                if std::io::stdout().is_terminal() {
                    "pretty".to_string()
                } else {
                    "text".to_string()
                }
            },
            str::to_string,
        )
}

const fn default_true() -> bool {
    true
}
