//! Specflow Config
//!
//! Serializable configuration types for specflow.
//!
//! Settings can be loaded from:
//! - JSON files (`specflow.json`)
//! - YAML files (`specflow.yaml` / `specflow.yml`)
//!
//! Every field has a default, so a partial file (or no file at all) is valid.

mod error;
mod mode;
mod settings;

pub use error::SettingsError;
pub use mode::ExecutionMode;
pub use settings::{ClassifierSettings, Settings};
