//! Stylesheet compilation (Sass, SCSS, Stylus) to plain CSS.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use grass::{InputSyntax, Options};

use super::process::{ProcessError, run_filter};

/// Source languages a `<style>` block or stylesheet may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleDialect {
    /// Indentation-based syntax
    Sass,
    /// CSS superset with nesting
    Scss,
    /// Expression-based syntax, compiled by the external `stylus` tool
    Stylus,
}

impl StyleDialect {
    /// The name used in `type="text/<name>"` attributes.
    pub fn name(self) -> &'static str {
        match self {
            StyleDialect::Sass => "sass",
            StyleDialect::Scss => "scss",
            StyleDialect::Stylus => "stylus",
        }
    }
}

impl fmt::Display for StyleDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StyleError {
    #[error("{dialect} compilation failed: {message}")]
    Sass {
        dialect: StyleDialect,
        message: String,
    },

    #[error("stylus compilation failed: {0}")]
    Stylus(#[from] ProcessError),
}

pub struct StyleCompiler {
    stylus: String,
    timeout: Duration,
}

impl StyleCompiler {
    pub fn new(stylus: &str, timeout: Duration) -> Self {
        Self {
            stylus: stylus.to_string(),
            timeout,
        }
    }

    /// Compile `source` to CSS. `base_dir` resolves `@import`s.
    pub fn compile(
        &self,
        source: &str,
        dialect: StyleDialect,
        base_dir: &Path,
    ) -> Result<String, StyleError> {
        match dialect {
            StyleDialect::Sass => compile_with_grass(source, InputSyntax::Sass, dialect, base_dir),
            StyleDialect::Scss => compile_with_grass(source, InputSyntax::Scss, dialect, base_dir),
            StyleDialect::Stylus => {
                let include = base_dir.to_string_lossy();
                Ok(run_filter(
                    &self.stylus,
                    &["--include", &include],
                    source,
                    self.timeout,
                )?)
            }
        }
    }
}

fn compile_with_grass(
    source: &str,
    syntax: InputSyntax,
    dialect: StyleDialect,
    base_dir: &Path,
) -> Result<String, StyleError> {
    let options = Options::default().input_syntax(syntax).load_path(base_dir);
    grass::from_string(source.to_string(), &options).map_err(|e| StyleError::Sass {
        dialect,
        message: e.to_string(),
    })
}
