//! Markdown rendering stage.

use crate::compile::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that converts the document to HTML.
///
/// Code fences and style blocks are already placeholders or raw HTML at this
/// point, so markdown syntax inside them cannot interfere. After this stage
/// `doc.content` is an HTML fragment.
pub struct MarkdownStage;

impl Stage for MarkdownStage {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        doc.content = ctx.markdown.render(&doc.content);
        Ok(())
    }
}
