//! Configuration type definitions.
//!
//! This module contains the data structures read from `gitdoc.yaml` and
//! `GITDOC_*` environment variables. These types are pure data - no I/O.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// =============================================================================
// File config
// =============================================================================

/// Everything that may be set from the config file or the environment.
///
/// ```yaml
/// title: Documents
/// header: '<meta name="robots" content="noindex">'
/// default_styles: true
/// export:
///   enabled: false
///   dir: build
/// tools:
///   highlighter: pygments
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    /// Page title (defaults to "Documents")
    pub title: Option<String>,
    /// Raw markup appended to every page's `<head>`
    pub header: Option<String>,
    /// Include the bundled default theme in `/gitdoc.css`
    pub default_styles: Option<bool>,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

// =============================================================================
// Export configuration
// =============================================================================

/// Write-through export of served responses into a static directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Output directory, relative to the document root
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("build")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_export_dir(),
        }
    }
}

// =============================================================================
// Markdown configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Extensions to enable for markdown processing
    #[serde(default = "default_markdown_extensions")]
    pub extensions: Vec<String>,
}

fn default_markdown_extensions() -> Vec<String> {
    vec![
        "definition_lists".to_string(),
        "footnotes".to_string(),
        "gfm".to_string(),
        "heading_attributes".to_string(),
        "strikethrough".to_string(),
        "tables".to_string(),
        "tasklists".to_string(),
    ]
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extensions: default_markdown_extensions(),
        }
    }
}

// =============================================================================
// External tools
// =============================================================================

/// Which backend turns fenced code into highlighted HTML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlighterKind {
    /// Spawn `pygmentize` for every fragment
    #[default]
    Pygments,
    /// In-process tree-sitter highlighting
    Builtin,
    /// No highlighting, escaped `<pre><code>` only
    Plain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub highlighter: HighlighterKind,
    #[serde(default = "default_pygmentize")]
    pub pygmentize: String,
    #[serde(default = "default_stylus")]
    pub stylus: String,
    #[serde(default = "default_coffee")]
    pub coffee: String,
    /// Upper bound for any external process, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Theme for the builtin highlighter's stylesheet
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_pygmentize() -> String {
    "pygmentize".to_string()
}

fn default_stylus() -> String {
    "stylus".to_string()
}

fn default_coffee() -> String {
    "coffee".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_theme() -> String {
    "dracula".to_string()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            highlighter: HighlighterKind::default(),
            pygmentize: default_pygmentize(),
            stylus: default_stylus(),
            coffee: default_coffee(),
            timeout_ms: default_timeout_ms(),
            theme: default_theme(),
        }
    }
}
