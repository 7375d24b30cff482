//! Preformatted newline normalization stage.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::compile::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

static PRE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<pre\b[^>]*>.*?</pre>").unwrap());

/// Replace literal newlines inside `<pre>` blocks with `&#x000A;`.
///
/// The rendered document can then be indented inside the page template
/// without adding whitespace to preformatted text.
pub fn newline_entities_for_pre(html: &str) -> String {
    PRE_BLOCK
        .replace_all(html, |caps: &Captures| caps[0].replace('\n', "&#x000A;"))
        .into_owned()
}

/// Stage that encodes newlines inside preformatted blocks.
pub struct NewlineStage;

impl Stage for NewlineStage {
    fn name(&self) -> &'static str {
        "newlines"
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        _ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        doc.content = newline_entities_for_pre(&doc.content);
        Ok(())
    }
}
