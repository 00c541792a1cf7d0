use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::mode::ExecutionMode;

/// Thresholds that turn a classification score into a complexity tier.
///
/// `score < medium_threshold` is simple, `score < complex_threshold` is
/// medium, anything else is complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
  pub medium_threshold: u32,
  pub complex_threshold: u32,
}

impl Default for ClassifierSettings {
  fn default() -> Self {
    Self {
      medium_threshold: 4,
      complex_threshold: 10,
    }
  }
}

/// Top-level specflow settings.
///
/// # Example
///
/// ```yaml
/// default_mode: smart
/// context_sharing: true
/// step_timeout_ms: 30000
/// docs_dir: .specflow/docs
/// classifier:
///   medium_threshold: 4
///   complex_threshold: 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Mode used when a request does not name one.
  pub default_mode: ExecutionMode,
  /// Whether later steps see earlier outputs by default.
  pub context_sharing: bool,
  /// Per-step timeout. `None` disables it.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub step_timeout_ms: Option<u64>,
  /// Project-relative directory where documents are written.
  pub docs_dir: String,
  pub classifier: ClassifierSettings,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      default_mode: ExecutionMode::Sequential,
      context_sharing: true,
      step_timeout_ms: None,
      docs_dir: ".specflow/docs".to_string(),
      classifier: ClassifierSettings::default(),
    }
  }
}

impl Settings {
  /// Load settings from a file, picking the parser from the extension.
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    let extension = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(|ext| ext.to_ascii_lowercase())
      .unwrap_or_default();

    match extension.as_str() {
      "json" => Self::from_json_str(&content),
      "yaml" | "yml" => Self::from_yaml_str(&content),
      _ => Err(SettingsError::UnsupportedFormat(path.display().to_string())),
    }
  }

  pub fn from_json_str(content: &str) -> Result<Self, SettingsError> {
    let settings: Settings = serde_json::from_str(content)?;
    settings.validate()?;
    Ok(settings)
  }

  pub fn from_yaml_str(content: &str) -> Result<Self, SettingsError> {
    // An empty YAML document deserializes to unit, not to an empty map.
    if content.trim().is_empty() {
      return Ok(Self::default());
    }
    let settings: Settings = serde_yaml::from_str(content)?;
    settings.validate()?;
    Ok(settings)
  }

  /// Check cross-field constraints.
  pub fn validate(&self) -> Result<(), SettingsError> {
    if self.classifier.medium_threshold >= self.classifier.complex_threshold {
      return Err(SettingsError::Invalid(format!(
        "classifier.medium_threshold ({}) must be below classifier.complex_threshold ({})",
        self.classifier.medium_threshold, self.classifier.complex_threshold
      )));
    }

    if self.docs_dir.trim().is_empty() {
      return Err(SettingsError::Invalid("docs_dir must not be empty".to_string()));
    }

    if self.step_timeout_ms == Some(0) {
      return Err(SettingsError::Invalid(
        "step_timeout_ms must be greater than zero".to_string(),
      ));
    }

    Ok(())
  }

  pub fn step_timeout(&self) -> Option<Duration> {
    self.step_timeout_ms.map(Duration::from_millis)
  }
}
