use serde::Serialize;
use tera::{Context, Tera};

const PAGE_TEMPLATE: &str = include_str!("../../assets/templates/page.html");

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

/// The page renderer, wrapping Tera.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Create a renderer holding the embedded page template.
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_template("page.html", PAGE_TEMPLATE)?;
        Ok(Self { tera })
    }

    /// Wrap compiled document HTML into a full page.
    ///
    /// With a `custom_body` template, that template (rendered with the same
    /// context) replaces the default `<div id="doc">` wrapper.
    pub fn render_page(
        &self,
        context: &PageContext,
        custom_body: Option<&str>,
    ) -> Result<String, RenderError> {
        let mut tera_context = Context::from_serialize(context)?;
        if let Some(template) = custom_body {
            let body = Tera::one_off(template, &tera_context, false)?;
            tera_context.insert("custom_body", &body);
        }
        Ok(self.tera.render("page.html", &tera_context)?)
    }
}

/// Context passed to the page template and custom body templates.
#[derive(Debug, Serialize)]
pub struct PageContext {
    pub title: String,
    /// Extra markup for `<head>`
    pub header: Option<String>,
    /// Compiled document HTML
    pub doc: String,
}
