//! Highlighted code re-injection stage.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::compile::highlight::Highlighter;
use crate::compile::pipeline::{
    CodeMap, PipelineContext, PipelineError, ProcessingDocument, Stage,
};
use crate::util::plain_code_block;

static INDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^(?:  |\t)").unwrap());

/// Strip one level of indentation (two spaces or a tab) from every line, but
/// only if every non-blank line has it.
pub fn unindent(code: &str) -> Cow<'_, str> {
    let indented = code
        .lines()
        .all(|line| line.trim().is_empty() || line.starts_with("  ") || line.starts_with('\t'));
    if indented {
        INDENT.replace_all(code, "")
    } else {
        Cow::Borrowed(code)
    }
}

/// Replace each fragment's placeholder with its highlighted HTML.
///
/// A placeholder that markdown wrapped in a paragraph of its own loses the
/// paragraph. A fragment the highlighter cannot handle is emitted as an
/// escaped, unhighlighted block.
pub fn inject_code(html: &str, code_map: &CodeMap, highlighter: &dyn Highlighter) -> String {
    let mut html = html.to_string();
    for (fingerprint, fragment) in code_map.iter() {
        let code = unindent(&fragment.code);
        let highlighted = match highlighter.highlight(&code, &fragment.language) {
            Ok(highlighted) => highlighted,
            Err(e) => {
                tracing::warn!(
                    language = %fragment.language,
                    fingerprint = %fingerprint,
                    error = %e,
                    "highlighting failed, emitting plain code"
                );
                plain_code_block(&code, &fragment.language)
            }
        };

        let placeholder = fingerprint.placeholder();
        html = html
            .replace(&format!("<p>{placeholder}</p>"), &highlighted)
            .replace(&placeholder, &highlighted);
    }
    html
}

/// Stage that puts highlighted code back where the fences were.
pub struct HighlightStage;

impl Stage for HighlightStage {
    fn name(&self) -> &'static str {
        "highlight"
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        if !doc.code_map.is_empty() {
            doc.content = inject_code(&doc.content, &doc.code_map, ctx.highlighter);
        }
        Ok(())
    }
}
