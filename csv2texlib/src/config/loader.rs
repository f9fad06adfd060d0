//! Reading configuration files.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_yaml::Value;

use super::model::{ConfigWarning, Configuration};
use crate::error::Csv2TexError;
use crate::Result;

impl Configuration {
    /// Resolve configuration from YAML text.
    ///
    /// Empty or whitespace-only text resolves to the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Configuration> {
        if text.trim().is_empty() {
            return Configuration::resolve(&Value::Null);
        }
        let raw: Value = serde_yaml::from_str(text)?;
        Configuration::resolve(&raw)
    }

    /// Resolve configuration from a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Configuration> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Csv2TexError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Configuration::from_yaml_str(&text)
    }

    /// Resolve configuration from a YAML file, falling back to the defaults
    /// when the file does not exist.
    ///
    /// A missing file is recorded as a warning. Any other read or parse
    /// failure is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Configuration> {
        let path = path.as_ref();
        match Configuration::from_path(path) {
            Err(Csv2TexError::ConfigRead { source, .. }) if source.kind() == ErrorKind::NotFound => {
                let warning = ConfigWarning {
                    section: path.display().to_string(),
                    message: "not found, using defaults".to_string(),
                };
                tracing::warn!("{}", warning);
                let mut config = Configuration::default();
                config.warnings.push(warning);
                Ok(config)
            }
            other => other,
        }
    }
}
