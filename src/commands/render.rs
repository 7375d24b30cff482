use std::io::Write;
use std::path::Path;

use anyhow::Context as _;

use crate::{
    RenderArgs,
    compile::Compiler,
    config::{Overrides, Settings},
};

/// What a source file compiles to, chosen by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Markdown,
    Html,
    Coffee,
}

impl SourceKind {
    fn of(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "md" => Some(Self::Markdown),
            "html" => Some(Self::Html),
            "coffee" => Some(Self::Coffee),
            _ => None,
        }
    }
}

pub async fn run(args: &RenderArgs) -> Result<(), anyhow::Error> {
    let kind = SourceKind::of(&args.file).ok_or_else(|| {
        anyhow::anyhow!(
            "Don't know how to render {}: expected a .md, .html or .coffee file",
            args.file.display()
        )
    })?;
    let source = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let source_dir = match args.file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    let settings = Settings::load(&source_dir, args.config_file.as_deref(), &Overrides::default())?;
    let compiler = Compiler::new(&settings)?;

    let output = tokio::task::spawn_blocking(move || render(&compiler, kind, &source, &source_dir))
        .await??;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn render(
    compiler: &Compiler,
    kind: SourceKind,
    source: &str,
    source_dir: &Path,
) -> Result<String, anyhow::Error> {
    Ok(match kind {
        SourceKind::Markdown => compiler.compile_document(source, source_dir)?,
        SourceKind::Html => compiler.compile_html(source, source_dir)?,
        SourceKind::Coffee => compiler.compile_coffee(source)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::highlight::PlainHighlighter;

    #[test]
    fn test_source_kind_from_extension() {
        assert_eq!(SourceKind::of(Path::new("a/b.md")), Some(SourceKind::Markdown));
        assert_eq!(SourceKind::of(Path::new("page.html")), Some(SourceKind::Html));
        assert_eq!(SourceKind::of(Path::new("app.coffee")), Some(SourceKind::Coffee));
        assert_eq!(SourceKind::of(Path::new("notes.txt")), None);
        assert_eq!(SourceKind::of(Path::new("README")), None);
    }

    #[test]
    fn test_render_markdown_fragment() {
        let compiler = Compiler::new(&Settings::for_dir("."))
            .unwrap()
            .with_highlighter(Box::new(PlainHighlighter));

        let html = render(&compiler, SourceKind::Markdown, "# Title\n", Path::new(".")).unwrap();

        assert_eq!(html, "<h1>Title</h1>\n");
    }
}
