//! Project configuration module.
//!
//! Handles loading, validating, and merging `bookbuilder.toml`. The file is
//! optional and sparse: stock defaults are overridden by whatever keys the
//! user file sets, nothing more.
//!
//! ## Config File Location
//!
//! Place `bookbuilder.toml` next to `mkdocs.yml` in the project root:
//!
//! ```text
//! project/
//! ├── bookbuilder.toml         # Optional, overrides stock defaults
//! ├── mkdocs.yml               # Navigation tree (chapter order)
//! └── docs/
//!     ├── preface/preface.md
//!     └── ...
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! mkdocs = "mkdocs.yml"     # Navigation config, relative to the project root
//! exclude = ["Welcome", "Get Setup", "Prerequisites", "Further Learning", "Style Guide"]
//! sample_chapters = ["Preface", "Learning Goals", "Introduction to Graphs", "The NetworkX API"]
//!
//! [preface]
//! enabled = true
//! title = "Preface"
//! path = "preface/preface.md"
//!
//! [notebook]
//! kernel = "nams"
//! timeout_secs = 600
//! markdown_calls = [".head()", ".describe()"]
//! comment_out = []
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the project config file looked up in the project root.
pub const CONFIG_FILE: &str = "bookbuilder.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Book configuration loaded from `bookbuilder.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BookConfig {
    /// Path to the MkDocs config holding the `nav` tree.
    pub mkdocs: String,
    /// Chapter titles dropped from the book (exact match).
    pub exclude: Vec<String>,
    /// Chapter titles marked as free samples on the platform.
    pub sample_chapters: Vec<String>,
    /// Entry inserted ahead of everything in the nav.
    pub preface: PrefaceConfig,
    /// Notebook execution and pre-execution rewrites.
    pub notebook: NotebookConfig,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            mkdocs: "mkdocs.yml".to_string(),
            exclude: [
                "Welcome",
                "Get Setup",
                "Prerequisites",
                "Further Learning",
                "Style Guide",
            ]
            .map(String::from)
            .to_vec(),
            sample_chapters: [
                "Preface",
                "Learning Goals",
                "Introduction to Graphs",
                "The NetworkX API",
            ]
            .map(String::from)
            .to_vec(),
            preface: PrefaceConfig::default(),
            notebook: NotebookConfig::default(),
        }
    }
}

impl BookConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mkdocs.trim().is_empty() {
            return Err(ConfigError::Validation("mkdocs must not be empty".into()));
        }
        if self.notebook.kernel.trim().is_empty() {
            return Err(ConfigError::Validation(
                "notebook.kernel must not be empty".into(),
            ));
        }
        if self.notebook.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "notebook.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.preface.enabled && self.preface.path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "preface.path must not be empty when the preface is enabled".into(),
            ));
        }
        Ok(())
    }

    /// Whether a chapter title carries the `{sample: true}` marker.
    pub fn is_sample(&self, title: &str) -> bool {
        self.sample_chapters.iter().any(|t| t == title)
    }
}

/// Preface entry prepended to the flattened navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrefaceConfig {
    pub enabled: bool,
    pub title: String,
    /// Source path relative to the docs directory.
    pub path: String,
}

impl Default for PrefaceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "Preface".to_string(),
            path: "preface/preface.md".to_string(),
        }
    }
}

/// Notebook execution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotebookConfig {
    /// Jupyter kernel the notebooks execute against.
    pub kernel: String,
    /// Per-cell execution timeout in seconds.
    pub timeout_secs: u64,
    /// Code lines ending with one of these get printed as a markdown table.
    pub markdown_calls: Vec<String>,
    /// Literal snippets commented out before execution.
    pub comment_out: Vec<String>,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            kernel: "nams".to_string(),
            timeout_secs: 600,
            markdown_calls: [
                ".head()",
                ".describe()",
                "correlation_centrality(graphs[0]",
                "find_connected_persons(G, 'p2', 'c10')",
            ]
            .map(String::from)
            .to_vec(),
            comment_out: vec!["HTML(anim(G2, msg, n_frames=4).to_html5_video())".to_string()],
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(BookConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, arrays included.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `bookbuilder.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BookConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BookConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `bookbuilder.toml` in the project root.
pub fn load_config(root: &Path) -> Result<BookConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `bookbuilder.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# bookbuilder configuration
# =========================
# All settings are optional. Remove any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# MkDocs config holding the `nav` tree, relative to the project root.
# Its `docs_dir` (default "docs") is where chapter sources are read from.
mkdocs = "mkdocs.yml"

# Chapter titles left out of the manuscript (exact title match).
exclude = [
    "Welcome",
    "Get Setup",
    "Prerequisites",
    "Further Learning",
    "Style Guide",
]

# Chapters published as free samples ({sample: true}).
sample_chapters = [
    "Preface",
    "Learning Goals",
    "Introduction to Graphs",
    "The NetworkX API",
]

# ---------------------------------------------------------------------------
# Preface, inserted before the first nav entry
# ---------------------------------------------------------------------------
[preface]
enabled = true
title = "Preface"
path = "preface/preface.md"

# ---------------------------------------------------------------------------
# Notebooks
# ---------------------------------------------------------------------------
[notebook]
# Jupyter kernel used to execute every notebook.
kernel = "nams"

# Per-cell execution timeout in seconds.
timeout_secs = 600

# Code lines ending with any of these are rewritten to
# print(<line>.to_markdown()) so the result renders as a markdown table.
markdown_calls = [
    ".head()",
    ".describe()",
    "correlation_centrality(graphs[0]",
    "find_connected_persons(G, 'p2', 'c10')",
]

# Snippets commented out before execution (e.g. video output).
comment_out = [
    "HTML(anim(G2, msg, n_frames=4).to_html5_video())",
]
"##
}
