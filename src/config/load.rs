//! Layered configuration loading.
//!
//! Precedence, lowest first: built-in defaults, the config file, `GITDOC_*`
//! environment variables, then command line overrides.

use std::path::Path;

use config::{Environment, File};

use super::types::FileConfig;
use super::{CONFIG_FILE_NAME, ConfigError, Settings};

/// Values given on the command line, applied last.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub title: Option<String>,
    pub header: Option<String>,
    pub no_default_styles: bool,
    pub export: bool,
}

impl Settings {
    /// Load settings for the document root `dir`.
    ///
    /// When `config_file` is `None`, `gitdoc.yaml` inside `dir` is used if it
    /// exists. An explicitly given config file must exist.
    pub fn load(
        dir: &Path,
        config_file: Option<&Path>,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError> {
        if !dir.is_dir() {
            return Err(ConfigError::MissingDir(dir.to_path_buf()));
        }
        let dir = dir
            .canonicalize()
            .map_err(|e| ConfigError::Canonicalize(dir.to_path_buf(), e))?;

        let file_source = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::from(dir.join(CONFIG_FILE_NAME)).required(false),
        };

        let layered = config::Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix("GITDOC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let file: FileConfig = layered.try_deserialize()?;

        let mut settings = Self::from_file_config(dir, file);
        settings.apply(overrides);
        Ok(settings)
    }

    fn apply(&mut self, overrides: &Overrides) {
        if let Some(title) = &overrides.title {
            self.title = title.clone();
        }
        if let Some(header) = &overrides.header {
            self.header = Some(header.clone());
        }
        if overrides.no_default_styles {
            self.default_styles = false;
        }
        if overrides.export {
            self.export.enabled = true;
        }
    }
}
