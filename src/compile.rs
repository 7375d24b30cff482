pub mod highlight;
pub mod markdown;
pub mod pipeline;
pub mod process;
mod render;
pub mod script;
pub mod style;

pub use render::{PageContext, RenderError, Renderer};

use std::path::Path;

use highlight::Highlighter;
use markdown::{MarkdownError, MarkdownRenderer};
use pipeline::{Pipeline, PipelineContext, PipelineError, ProcessingDocument};
use script::{ScriptCompiler, ScriptError};
use style::{StyleCompiler, StyleDialect, StyleError};

use crate::config::Settings;

/// GitDoc's version, shown on the 404 page and visible to directives.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything needed to turn sources into HTML, CSS and JavaScript.
///
/// Built once from [`Settings`] and shared read-only by every request.
pub struct Compiler {
    highlighter: Box<dyn Highlighter>,
    markdown: MarkdownRenderer,
    styles: StyleCompiler,
    scripts: ScriptCompiler,
    template_vars: tera::Context,
    document_pipeline: Pipeline,
    html_pipeline: Pipeline,
}

impl Compiler {
    pub fn new(settings: &Settings) -> Result<Self, MarkdownError> {
        let timeout = settings.tool_timeout();

        let mut template_vars = tera::Context::new();
        template_vars.insert("title", &settings.title);
        template_vars.insert("version", VERSION);

        let document_pipeline = Pipeline::document_pipeline();
        let html_pipeline = Pipeline::html_pipeline();
        tracing::debug!(
            document = ?document_pipeline.stage_names(),
            html = ?html_pipeline.stage_names(),
            highlighter = ?settings.tools.highlighter,
            "compiler ready"
        );

        Ok(Self {
            highlighter: highlight::from_config(&settings.tools, timeout),
            markdown: MarkdownRenderer::new(&settings.markdown)?,
            styles: StyleCompiler::new(&settings.tools.stylus, timeout),
            scripts: ScriptCompiler::new(&settings.tools.coffee, timeout),
            template_vars,
            document_pipeline,
            html_pipeline,
        })
    }

    /// Replace the highlighter chosen by the settings.
    pub fn with_highlighter(mut self, highlighter: Box<dyn Highlighter>) -> Self {
        self.highlighter = highlighter;
        self
    }

    /// Run a markdown document through the document pipeline.
    pub fn compile_document(
        &self,
        source: &str,
        source_dir: &Path,
    ) -> Result<String, PipelineError> {
        self.run(&self.document_pipeline, source, source_dir)
    }

    /// Compile the typed style and script tags of an HTML document.
    pub fn compile_html(&self, source: &str, source_dir: &Path) -> Result<String, PipelineError> {
        self.run(&self.html_pipeline, source, source_dir)
    }

    /// Compile a whole stylesheet.
    pub fn compile_stylesheet(
        &self,
        source: &str,
        dialect: StyleDialect,
        base_dir: &Path,
    ) -> Result<String, StyleError> {
        self.styles.compile(source, dialect, base_dir)
    }

    /// Compile a whole CoffeeScript file.
    pub fn compile_coffee(&self, source: &str) -> Result<String, ScriptError> {
        self.scripts.compile(source)
    }

    /// CSS for the active highlighter's output.
    pub fn highlight_css(&self) -> String {
        self.highlighter.stylesheet()
    }

    pub(crate) fn context(&self) -> PipelineContext<'_> {
        PipelineContext {
            highlighter: self.highlighter.as_ref(),
            markdown: &self.markdown,
            styles: &self.styles,
            scripts: &self.scripts,
            template_vars: &self.template_vars,
        }
    }

    fn run(
        &self,
        pipeline: &Pipeline,
        source: &str,
        source_dir: &Path,
    ) -> Result<String, PipelineError> {
        let mut doc = ProcessingDocument::new(source, source_dir);
        pipeline.run(&mut doc, &self.context())?;
        tracing::trace!(fragments = doc.code_map.len(), "compiled");
        Ok(doc.content)
    }
}
