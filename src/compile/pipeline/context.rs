//! Pipeline context for sharing services across stages.

use crate::compile::highlight::Highlighter;
use crate::compile::markdown::MarkdownRenderer;
use crate::compile::script::ScriptCompiler;
use crate::compile::style::StyleCompiler;

/// Shared, read-only context for pipeline stages.
pub struct PipelineContext<'a> {
    /// Syntax highlighter for extracted code fragments
    pub highlighter: &'a dyn Highlighter,

    pub markdown: &'a MarkdownRenderer,

    pub styles: &'a StyleCompiler,

    pub scripts: &'a ScriptCompiler,

    /// Variables visible to `/// tera` directives
    pub template_vars: &'a tera::Context,
}
