use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
  #[error("failed to read settings file {path}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid JSON settings: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid YAML settings: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error("unsupported settings format: {0} (expected .json, .yaml or .yml)")]
  UnsupportedFormat(String),

  #[error("invalid settings: {0}")]
  Invalid(String),
}
