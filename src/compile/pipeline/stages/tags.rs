//! Typed `<style>` and `<script>` tags in HTML documents.
//!
//! `<style type="text/sass">` (or scss, stylus) becomes a `text/css` tag and
//! `<script type="text/coffeescript">` becomes a `text/javascript` tag, each
//! with its body compiled.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::try_replace_all;
use crate::compile::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};
use crate::compile::script::{ScriptCompiler, ScriptError};
use crate::compile::style::{StyleCompiler, StyleDialect, StyleError};

fn style_tag(dialect: &str) -> Regex {
    Regex::new(&format!(
        r#"(?ms)^<style type=['"]?text/{dialect}['"]?>\r?\n(.*?)</style>[ \t]*\r?$"#
    ))
    .unwrap()
}

static SASS_TAG: LazyLock<Regex> = LazyLock::new(|| style_tag("sass"));
static SCSS_TAG: LazyLock<Regex> = LazyLock::new(|| style_tag("scss"));
static STYLUS_TAG: LazyLock<Regex> = LazyLock::new(|| style_tag("stylus"));

static COFFEE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?ms)^<script type=['"]?text/coffeescript['"]?>\r?\n(.*?)</script>[ \t]*\r?$"#,
    )
    .unwrap()
});

fn style_pattern(dialect: StyleDialect) -> &'static Regex {
    match dialect {
        StyleDialect::Sass => &*SASS_TAG,
        StyleDialect::Scss => &*SCSS_TAG,
        StyleDialect::Stylus => &*STYLUS_TAG,
    }
}

/// Compile every `<style type="text/{dialect}">` tag to a CSS tag.
pub fn compile_style_tags(
    source: &str,
    dialect: StyleDialect,
    styles: &StyleCompiler,
    base_dir: &Path,
) -> Result<String, StyleError> {
    try_replace_all(style_pattern(dialect), source, |caps| {
        let css = styles.compile(&caps[1], dialect, base_dir)?;
        Ok(format!("<style type='text/css'>\n{css}</style>"))
    })
}

/// Compile every `<script type="text/coffeescript">` tag to a JavaScript tag.
pub fn compile_coffee_tags(source: &str, scripts: &ScriptCompiler) -> Result<String, ScriptError> {
    try_replace_all(&COFFEE_TAG, source, |caps| {
        let js = scripts.compile(&caps[1])?;
        Ok(format!("<script type='text/javascript'>\n{js}</script>"))
    })
}

/// Stage that compiles style tags of one dialect.
pub struct StyleTagStage {
    dialect: StyleDialect,
}

impl StyleTagStage {
    pub fn new(dialect: StyleDialect) -> Self {
        Self { dialect }
    }
}

impl Stage for StyleTagStage {
    fn name(&self) -> &'static str {
        self.dialect.name()
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        doc.content = compile_style_tags(&doc.content, self.dialect, ctx.styles, &doc.source_dir)?;
        Ok(())
    }
}

/// Stage that compiles CoffeeScript tags.
pub struct CoffeeTagStage;

impl Stage for CoffeeTagStage {
    fn name(&self) -> &'static str {
        "coffeescript"
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        doc.content = compile_coffee_tags(&doc.content, ctx.scripts)?;
        Ok(())
    }
}
