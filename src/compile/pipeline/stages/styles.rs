//! Inline style block stage.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::try_replace_all;
use crate::compile::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};
use crate::compile::style::{StyleCompiler, StyleDialect, StyleError};

/// `<style>` or `<style type="text/css">` at the start of a line, through
/// the closing tag.
static STYLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?ms)^<style\s?(?:type=['"]?text/css['"]?)?>\r?\n(.*?)</style>[ \t]*\r?$"#)
        .unwrap()
});

/// Compile every inline style block as SCSS.
///
/// The result is wrapped in a `<div>` so markdown treats it as one raw HTML
/// block; blank lines, which would end that block, are dropped from the CSS.
pub fn extract_styles(
    source: &str,
    styles: &StyleCompiler,
    base_dir: &Path,
) -> Result<String, StyleError> {
    try_replace_all(&STYLE_BLOCK, source, |caps| {
        let css = styles.compile(&caps[1], StyleDialect::Scss, base_dir)?;
        let mut block = String::from("<div><style type='text/css'>\n");
        for line in css.lines().filter(|line| !line.trim().is_empty()) {
            block.push_str(line);
            block.push('\n');
        }
        block.push_str("</style></div>");
        Ok(block)
    })
}

/// Stage that compiles inline `<style>` blocks.
pub struct StyleStage;

impl Stage for StyleStage {
    fn name(&self) -> &'static str {
        "styles"
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        doc.content = extract_styles(&doc.content, ctx.styles, &doc.source_dir)?;
        Ok(())
    }
}
