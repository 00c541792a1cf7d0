use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RoleError;

/// Identifier of a pipeline role.
///
/// Variants are declared in canonical pipeline order, so the derived `Ord`
/// doubles as the planner's tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleId {
  TaskManagement,
  Requirements,
  Design,
  Coding,
  Testing,
  #[serde(alias = "coordination")]
  SpecCoordination,
}

impl RoleId {
  /// All roles in canonical pipeline order.
  pub const ALL: [RoleId; 6] = [
    RoleId::TaskManagement,
    RoleId::Requirements,
    RoleId::Design,
    RoleId::Coding,
    RoleId::Testing,
    RoleId::SpecCoordination,
  ];

  /// Roles that are required by default when no explicit subset is given.
  pub const CORE: [RoleId; 5] = [
    RoleId::TaskManagement,
    RoleId::Requirements,
    RoleId::Design,
    RoleId::Coding,
    RoleId::Testing,
  ];

  /// Stable string form, e.g. `"task-management"`.
  pub fn as_str(&self) -> &'static str {
    match self {
      RoleId::TaskManagement => "task-management",
      RoleId::Requirements => "requirements",
      RoleId::Design => "design",
      RoleId::Coding => "coding",
      RoleId::Testing => "testing",
      RoleId::SpecCoordination => "spec-coordination",
    }
  }

  /// Position in the canonical pipeline (0 = first).
  pub fn priority(&self) -> usize {
    *self as usize
  }
}

impl fmt::Display for RoleId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RoleId {
  type Err = RoleError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
    match normalized.as_str() {
      "task-management" | "tasks" => Ok(RoleId::TaskManagement),
      "requirements" => Ok(RoleId::Requirements),
      "design" => Ok(RoleId::Design),
      "coding" => Ok(RoleId::Coding),
      "testing" => Ok(RoleId::Testing),
      "spec-coordination" | "coordination" => Ok(RoleId::SpecCoordination),
      _ => Err(RoleError::UnknownRole(s.to_string())),
    }
  }
}

/// Static description of a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDescriptor {
  pub id: RoleId,
  /// Human-readable responsibility.
  pub responsibility: String,
  /// Capability tags, e.g. `"user-stories"`.
  pub capability_tags: BTreeSet<String>,
  /// Roles whose output this role builds on.
  pub upstream_dependencies: BTreeSet<RoleId>,
  /// When set, `upstream_dependencies` means "whichever of these were
  /// selected" rather than a strict requirement. Used by the coordination role.
  #[serde(default)]
  pub aggregates_selected: bool,
}

impl RoleDescriptor {
  pub fn new(
    id: RoleId,
    responsibility: impl Into<String>,
    capability_tags: &[&str],
    upstream_dependencies: &[RoleId],
  ) -> Self {
    Self {
      id,
      responsibility: responsibility.into(),
      capability_tags: capability_tags.iter().map(|t| t.to_string()).collect(),
      upstream_dependencies: upstream_dependencies.iter().copied().collect(),
      aggregates_selected: false,
    }
  }

  /// Mark this role as aggregating over every selected upstream role.
  pub fn aggregating(mut self) -> Self {
    self.aggregates_selected = true;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_role_ids() {
    assert_eq!("design".parse::<RoleId>().unwrap(), RoleId::Design);
    assert_eq!(
      "Task_Management".parse::<RoleId>().unwrap(),
      RoleId::TaskManagement
    );
    assert_eq!(
      "coordination".parse::<RoleId>().unwrap(),
      RoleId::SpecCoordination
    );
  }

  #[test]
  fn test_parse_unknown_role() {
    let err = "marketing".parse::<RoleId>().unwrap_err();
    assert_eq!(err, RoleError::UnknownRole("marketing".to_string()));
  }

  #[test]
  fn test_serde_uses_kebab_case() {
    let json = serde_json::to_string(&RoleId::SpecCoordination).unwrap();
    assert_eq!(json, "\"spec-coordination\"");

    let parsed: RoleId = serde_json::from_str("\"coordination\"").unwrap();
    assert_eq!(parsed, RoleId::SpecCoordination);
  }

  #[test]
  fn test_priority_follows_pipeline_order() {
    let priorities: Vec<usize> = RoleId::ALL.iter().map(|r| r.priority()).collect();
    assert_eq!(priorities, vec![0, 1, 2, 3, 4, 5]);
    assert!(RoleId::Requirements < RoleId::Design);
  }
}
