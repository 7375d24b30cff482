//! Configuration loading and types for gitdoc.
//!
//! This module handles all aspects of configuration:
//! - Type definitions for config structures (`types`)
//! - Layered loading from file, environment and CLI (`load`)
//!
//! The result is a [`Settings`] value built once at start-up and passed by
//! reference from then on.

mod load;
mod types;

use std::path::PathBuf;
use std::time::Duration;

pub use load::Overrides;
pub use types::{ExportConfig, FileConfig, HighlighterKind, MarkdownConfig, ToolsConfig};

/// Title used when neither the config nor the CLI sets one.
pub const DEFAULT_TITLE: &str = "Documents";

/// Config file looked up in the document root when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "gitdoc.yaml";

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(#[from] config::ConfigError),

    #[error("document directory {0} does not exist")]
    MissingDir(PathBuf),

    #[error("failed to resolve document directory {0}: {1}")]
    Canonicalize(PathBuf, std::io::Error),
}

// =============================================================================
// Settings
// =============================================================================

/// Immutable process-wide settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Document root, canonicalized
    pub dir: PathBuf,
    pub title: String,
    pub header: Option<String>,
    pub default_styles: bool,
    pub export: ExportConfig,
    pub markdown: MarkdownConfig,
    pub tools: ToolsConfig,
}

impl Settings {
    /// Settings for `dir` with every option at its default.
    pub fn for_dir(dir: impl Into<PathBuf>) -> Self {
        Self::from_file_config(dir.into(), FileConfig::default())
    }

    pub(crate) fn from_file_config(dir: PathBuf, file: FileConfig) -> Self {
        Self {
            dir,
            title: file.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            header: file.header,
            default_styles: file.default_styles.unwrap_or(true),
            export: file.export,
            markdown: file.markdown,
            tools: file.tools,
        }
    }

    /// Directory exported responses are written to.
    pub fn export_dir(&self) -> PathBuf {
        if self.export.dir.is_relative() {
            self.dir.join(&self.export.dir)
        } else {
            self.export.dir.clone()
        }
    }

    /// Upper bound for external processes.
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.tools.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::for_dir("/docs");
        assert_eq!(settings.title, "Documents");
        assert!(settings.default_styles);
        assert!(!settings.export.enabled);
        assert_eq!(settings.tools.highlighter, HighlighterKind::Pygments);
        assert_eq!(settings.tool_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_export_dir_relative_to_root() {
        let settings = Settings::for_dir("/docs");
        assert_eq!(settings.export_dir(), PathBuf::from("/docs/build"));

        let mut settings = Settings::for_dir("/docs");
        settings.export.dir = PathBuf::from("/tmp/site");
        assert_eq!(settings.export_dir(), PathBuf::from("/tmp/site"));
    }
}
