//! Pipeline error types.

use crate::compile::script::ScriptError;
use crate::compile::style::StyleError;

/// Errors that can occur during pipeline processing.
///
/// Malformed markup is never an error; only the external compilers can fail.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Script(#[from] ScriptError),
}
