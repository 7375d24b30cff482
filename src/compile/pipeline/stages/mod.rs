//! Pipeline stages.
//!
//! Document pipeline:
//!
//! 1. **CodeStage** - Lift fenced code out of the text, leaving placeholders
//! 2. **DirectiveStage** - Render `/// tera` lines through the template engine
//! 3. **StyleStage** - Compile inline `<style>` blocks
//! 4. **MarkdownStage** - Convert markdown to HTML
//! 5. **HighlightStage** - Replace placeholders with highlighted code
//! 6. **NewlineStage** - Encode newlines inside `<pre>` blocks
//!
//! HTML pipeline: **StyleTagStage** (once per dialect), **CoffeeTagStage**.

mod code;
mod directive;
mod highlight;
mod markdown;
mod newlines;
mod styles;
mod tags;

pub use code::CodeStage;
pub use directive::DirectiveStage;
pub use highlight::HighlightStage;
pub use markdown::MarkdownStage;
pub use newlines::NewlineStage;
pub use styles::StyleStage;
pub use tags::{CoffeeTagStage, StyleTagStage};

use regex::{Captures, Regex};

/// `Regex::replace_all` for replacements that can fail.
///
/// Stops at the first error; on success every match has been replaced.
fn try_replace_all<E>(
    re: &Regex,
    text: &str,
    mut replace: impl FnMut(&Captures) -> Result<String, E>,
) -> Result<String, E> {
    let mut output = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        output.push_str(&text[last..whole.start()]);
        output.push_str(&replace(&caps)?);
        last = whole.end();
    }
    output.push_str(&text[last..]);
    Ok(output)
}
