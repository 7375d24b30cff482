//! Syntax highlighting backends for fenced code.

use std::time::Duration;

use autumnus::{HtmlLinkedBuilder, formatter::Formatter, languages::Language, themes};

use super::process::{ProcessError, run_filter};
use crate::config::{HighlighterKind, ToolsConfig};
use crate::util::plain_code_block;

/// Stylesheet matching the HTML `pygmentize -f html` emits.
const PYGMENTS_CSS: &str = include_str!("../../assets/highlight.css");

#[derive(thiserror::Error, Debug)]
pub enum HighlightError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("highlighter produced no output for language '{0}'")]
    EmptyOutput(String),

    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),

    #[error("failed to format '{language}': {message}")]
    Format { language: String, message: String },
}

/// Turns one code fragment into HTML.
///
/// Failures are returned, not papered over: the caller decides what to show
/// instead.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError>;

    /// CSS for the markup this highlighter produces.
    fn stylesheet(&self) -> String;
}

/// Build the highlighter selected in the config.
pub fn from_config(tools: &ToolsConfig, timeout: Duration) -> Box<dyn Highlighter> {
    match tools.highlighter {
        HighlighterKind::Pygments => Box::new(PygmentsHighlighter::new(&tools.pygmentize, timeout)),
        HighlighterKind::Builtin => Box::new(BuiltinHighlighter::new(&tools.theme)),
        HighlighterKind::Plain => Box::new(PlainHighlighter),
    }
}

// =============================================================================
// pygmentize
// =============================================================================

/// Highlights by running `pygmentize` once per fragment.
pub struct PygmentsHighlighter {
    command: String,
    timeout: Duration,
}

impl PygmentsHighlighter {
    pub fn new(command: &str, timeout: Duration) -> Self {
        Self {
            command: command.to_string(),
            timeout,
        }
    }
}

impl Highlighter for PygmentsHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError> {
        let args: Vec<&str> = if language.is_empty() {
            vec!["-g", "-f", "html"]
        } else {
            vec!["-l", language, "-f", "html"]
        };
        let output = run_filter(&self.command, &args, code, self.timeout)?;
        let output = output.trim();
        if output.is_empty() {
            return Err(HighlightError::EmptyOutput(language.to_string()));
        }
        Ok(output.to_string())
    }

    fn stylesheet(&self) -> String {
        PYGMENTS_CSS.to_string()
    }
}

// =============================================================================
// autumnus
// =============================================================================

/// In-process highlighter using autumnus (tree-sitter based).
pub struct BuiltinHighlighter {
    /// Theme name for CSS generation
    theme_name: String,
}

impl BuiltinHighlighter {
    pub fn new(theme_name: &str) -> Self {
        Self {
            theme_name: theme_name.to_string(),
        }
    }

    /// Generate CSS for the current theme.
    fn generate_css(&self) -> Option<String> {
        let theme = themes::get(&self.theme_name).ok()?;
        Some(theme.css(false)) // false = don't enable italic
    }
}

impl Highlighter for BuiltinHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError> {
        // Use Language::guess which handles language detection from name or extension
        let lang = Language::guess(language, code);

        if matches!(lang, Language::PlainText)
            && !language.is_empty()
            && language != "plaintext"
            && language != "text"
        {
            return Err(HighlightError::UnsupportedLanguage(language.to_string()));
        }

        let format_error = |message: String| HighlightError::Format {
            language: language.to_string(),
            message,
        };

        let formatter = HtmlLinkedBuilder::new()
            .source(code)
            .lang(lang)
            .build()
            .map_err(|_| format_error("invalid formatter options".to_string()))?;

        let mut output: Vec<u8> = Vec::new();
        formatter
            .format(&mut output)
            .map_err(|_| format_error("formatter failed".to_string()))?;
        String::from_utf8(output).map_err(|e| format_error(e.to_string()))
    }

    fn stylesheet(&self) -> String {
        self.generate_css().unwrap_or_default()
    }
}

// =============================================================================
// plain
// =============================================================================

/// Escapes code without highlighting it.
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError> {
        Ok(plain_code_block(code, language))
    }

    fn stylesheet(&self) -> String {
        String::new()
    }
}
