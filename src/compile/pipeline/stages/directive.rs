//! Inline template directive stage.
//!
//! A line of the form `/// tera <template>` is replaced by `<template>`
//! rendered through tera. Directives are single-line only.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tera::{Context, Tera};

use crate::compile::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*///[ \t]*tera[ \t]+(.+?)[ \t]*\r?$").unwrap()
});

/// Render every directive line. A line that fails to render is kept as is.
pub fn expand_directives(source: &str, vars: &Context) -> String {
    DIRECTIVE
        .replace_all(source, |caps: &Captures| {
            match Tera::one_off(&caps[1], vars, false) {
                Ok(rendered) => rendered,
                Err(e) => {
                    tracing::warn!(directive = &caps[1], error = %e, "template directive failed");
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// Stage that expands `/// tera` directives.
pub struct DirectiveStage;

impl Stage for DirectiveStage {
    fn name(&self) -> &'static str {
        "directive"
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        doc.content = expand_directives(&doc.content, ctx.template_vars);
        Ok(())
    }
}
