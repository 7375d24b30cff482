//! Fenced code extraction stage.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::compile::pipeline::{
    CodeMap, PipelineContext, PipelineError, ProcessingDocument, Stage,
};

/// A line opening with three backticks and an optional language tag, through
/// the next line holding only three backticks. The body is optional so an
/// empty block closes on its own fence.
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^``` ?([^\r\n]*?)[ \t]*\r?\n(?:(.*?)\r?\n)??```[ \t]*\r?$").unwrap()
});

/// Replace every fenced block with its fingerprint placeholder, filing the
/// fragment in `code_map`. Fragment line endings are normalized to `\n`.
pub fn extract_code(source: &str, code_map: &mut CodeMap) -> String {
    CODE_FENCE
        .replace_all(source, |caps: &Captures| {
            let code = caps.get(2).map_or("", |body| body.as_str());
            code_map.insert(&caps[1], &code.replace("\r\n", "\n")).placeholder()
        })
        .into_owned()
}

/// Stage that lifts fenced code out of the document so later stages cannot
/// reinterpret it as markdown or template syntax.
pub struct CodeStage;

impl Stage for CodeStage {
    fn name(&self) -> &'static str {
        "code"
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        _ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        doc.content = extract_code(&doc.content, &mut doc.code_map);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::pipeline::document::Fingerprint;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extracts_tagged_fence() {
        let mut map = CodeMap::new();
        let output = extract_code("Intro\n\n```ruby\nputs 1\n```\n\nOutro\n", &mut map);

        let fingerprint = Fingerprint::of("puts 1");
        assert_eq!(output, format!("Intro\n\n{}\n\nOutro\n", fingerprint.placeholder()));
        assert_eq!(map.len(), 1);
        let (_, fragment) = map.iter().next().unwrap();
        assert_eq!(fragment.language, "ruby");
        assert_eq!(fragment.code, "puts 1");
    }

    #[test]
    fn test_space_before_language_and_crlf() {
        let mut map = CodeMap::new();
        let output = extract_code("``` sh\r\nls -la\r\necho hi\r\n```\r\n", &mut map);

        assert!(!output.contains("```"));
        let (_, fragment) = map.iter().next().unwrap();
        assert_eq!(fragment.language, "sh");
        assert_eq!(fragment.code, "ls -la\necho hi");
    }

    #[test]
    fn test_untagged_fence() {
        let mut map = CodeMap::new();
        extract_code("```\nplain text\n```\n", &mut map);

        let (_, fragment) = map.iter().next().unwrap();
        assert_eq!(fragment.language, "");
        assert_eq!(fragment.code, "plain text");
    }

    #[test]
    fn test_fences_are_matched_non_greedily() {
        let mut map = CodeMap::new();
        let output = extract_code("```js\na()\n```\nbetween\n```py\nb()\n```\n", &mut map);

        assert_eq!(map.len(), 2);
        assert!(output.contains("\nbetween\n"));
    }

    #[test]
    fn test_markdown_inside_fence_is_hidden() {
        let mut map = CodeMap::new();
        let output = extract_code("```md\n# not a heading\n/// tera {{ 1 }}\n```\n", &mut map);

        assert!(!output.contains('#'));
        assert!(!output.contains("tera"));
    }

    #[test]
    fn test_empty_fence_closes_on_next_line() {
        let mut map = CodeMap::new();
        let output = extract_code("```\n```\n\ntext\n\n```ruby\nx\n```\n", &mut map);

        assert_eq!(map.len(), 2);
        assert!(output.contains("\n\ntext\n\n"));
        assert!(!output.contains("```"));
        let mut fragments: Vec<_> = map
            .iter()
            .map(|(_, f)| (f.language.as_str(), f.code.as_str()))
            .collect();
        fragments.sort();
        assert_eq!(fragments, vec![("", ""), ("ruby", "x")]);
    }

    #[test]
    fn test_fence_holding_one_blank_line() {
        let mut map = CodeMap::new();
        extract_code("```\n\n```\n", &mut map);

        let (_, fragment) = map.iter().next().unwrap();
        assert_eq!(fragment.code, "");
    }

    #[test]
    fn test_unclosed_fence_is_left_alone() {
        let mut map = CodeMap::new();
        let source = "```ruby\nputs 1\n";
        assert_eq!(extract_code(source, &mut map), source);
        assert!(map.is_empty());
    }
}
