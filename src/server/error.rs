//! Error types for the HTTP server.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::compile::markdown::MarkdownError;
use crate::compile::pipeline::PipelineError;
use crate::compile::script::ScriptError;
use crate::compile::style::StyleError;
use crate::compile::RenderError;

/// Server error type.
///
/// A missing file is not an error; resolution falls through to the next
/// route and finally to the 404 page.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Markdown options could not be built at start-up.
    #[error(transparent)]
    Markdown(#[from] MarkdownError),

    /// A document or HTML page failed to compile.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A stylesheet failed to compile.
    #[error(transparent)]
    Style(#[from] StyleError),

    /// A CoffeeScript file failed to compile.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// The page template or custom body failed to render.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// A matched file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The blocking resolver task panicked or was cancelled.
    #[error("request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(axum::http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
