//! Runtime configuration.
//!
//! All fields have defaults, so an empty YAML document (or no file at all)
//! yields a working configuration.
//!
//! ```yaml
//! data_path: ./data/cleaned_data.csv
//! model_dir: ./data/
//! target_column: Price
//! model_extensions: [bin, model]
//! currency: "€"
//! ```

use crate::predictor::DEFAULT_MODEL_EXTENSIONS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Historical training data (delimited text with a header row).
    pub data_path: PathBuf,
    /// Directory searched for model artifacts.
    pub model_dir: PathBuf,
    pub target_column: String,
    /// Recognized artifact extensions, without the leading dot.
    pub model_extensions: Vec<String>,
    /// Suffix appended to formatted estimates.
    pub currency: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./data/cleaned_data.csv"),
            model_dir: PathBuf::from("./data/"),
            target_column: "Price".to_string(),
            model_extensions: DEFAULT_MODEL_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            currency: "€".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to a defaulted struct.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_column.trim().is_empty() {
            return Err(ConfigError::Invalid("target_column is empty".to_string()));
        }
        if self.model_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "model_extensions must name at least one extension".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }
}
