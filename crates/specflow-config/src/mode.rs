use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// How the planner shapes a plan.
///
/// `Parallel` only removes inter-step dependency edges; the engine still runs
/// steps one at a time in plan order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
  /// Linear chain, one phase per step.
  #[default]
  Sequential,
  /// No dependency edges, a single phase.
  Parallel,
  /// Linear chain, steps grouped into phases by dependency depth.
  Smart,
}

impl ExecutionMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      ExecutionMode::Sequential => "sequential",
      ExecutionMode::Parallel => "parallel",
      ExecutionMode::Smart => "smart",
    }
  }
}

impl fmt::Display for ExecutionMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ExecutionMode {
  type Err = SettingsError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "sequential" => Ok(ExecutionMode::Sequential),
      "parallel" => Ok(ExecutionMode::Parallel),
      "smart" => Ok(ExecutionMode::Smart),
      other => Err(SettingsError::Invalid(format!(
        "unknown execution mode '{}'",
        other
      ))),
    }
  }
}
