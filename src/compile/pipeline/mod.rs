//! Document compiler pipeline.
//!
//! Two pipelines are built from the same stage machinery:
//!
//! - the document pipeline for markdown sources:
//!   code → directive → styles → markdown → highlight → newlines
//! - the HTML pipeline for `.html` sources:
//!   sass → scss → stylus → coffeescript
//!
//! Stage order is load-bearing. Every stage is best-effort: text it does not
//! recognise passes through untouched.

mod context;
mod document;
mod error;
mod stages;

pub use context::PipelineContext;
pub use document::{CodeMap, ProcessingDocument};
pub use error::PipelineError;

use stages::{
    CodeStage, CoffeeTagStage, DirectiveStage, HighlightStage, MarkdownStage, NewlineStage,
    StyleStage, StyleTagStage,
};

use crate::compile::style::StyleDialect;

/// A stage in the document processing pipeline.
///
/// Stages transform the document in place; each one also exposes its
/// transformation as a free function over strings.
pub trait Stage: Send + Sync {
    /// Unique name for this stage.
    fn name(&self) -> &'static str;

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError>;
}

/// An ordered list of stages.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create an empty pipeline with no stages.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// The pipeline for markdown documents.
    ///
    /// Stages: code → directive → styles → markdown → highlight → newlines
    pub fn document_pipeline() -> Self {
        let mut pipeline = Self::new();
        pipeline
            .add_stage(CodeStage)
            .add_stage(DirectiveStage)
            .add_stage(StyleStage)
            .add_stage(MarkdownStage)
            .add_stage(HighlightStage)
            .add_stage(NewlineStage);
        pipeline
    }

    /// The pipeline for HTML documents: style and script tags only.
    ///
    /// Stages: sass → scss → stylus → coffeescript
    pub fn html_pipeline() -> Self {
        let mut pipeline = Self::new();
        pipeline
            .add_stage(StyleTagStage::new(StyleDialect::Sass))
            .add_stage(StyleTagStage::new(StyleDialect::Scss))
            .add_stage(StyleTagStage::new(StyleDialect::Stylus))
            .add_stage(CoffeeTagStage);
        pipeline
    }

    /// Add a stage to the end of the pipeline.
    pub fn add_stage<S: Stage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Run every stage in order on one document.
    pub fn run(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        for stage in &self.stages {
            tracing::trace!(stage = stage.name(), "running stage");
            stage.process(doc, ctx)?;
        }
        Ok(())
    }

    /// Get the names of all stages in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::document_pipeline()
    }
}
