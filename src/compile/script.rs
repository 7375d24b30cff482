//! CoffeeScript compilation through the external `coffee` tool.

use std::time::Duration;

use super::process::{ProcessError, run_filter};

#[derive(thiserror::Error, Debug)]
#[error("coffeescript compilation failed: {0}")]
pub struct ScriptError(#[from] ProcessError);

pub struct ScriptCompiler {
    coffee: String,
    timeout: Duration,
}

impl ScriptCompiler {
    pub fn new(coffee: &str, timeout: Duration) -> Self {
        Self {
            coffee: coffee.to_string(),
            timeout,
        }
    }

    pub fn compile(&self, source: &str) -> Result<String, ScriptError> {
        Ok(run_filter(
            &self.coffee,
            &["--compile", "--stdio", "--print"],
            source,
            self.timeout,
        )?)
    }
}
