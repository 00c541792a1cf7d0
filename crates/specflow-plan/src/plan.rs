use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use specflow_config::ExecutionMode;
use specflow_roles::RoleId;

use crate::error::PlanError;

/// Step identifier. Ids are 1-based and follow plan order.
pub type StepId = usize;

/// One scheduled unit of work, bound to a single role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStep {
  pub id: StepId,
  pub role: RoleId,
  /// Steps that must resolve before this one.
  pub depends_on: BTreeSet<StepId>,
  /// Scheduled roles whose output this step builds on.
  #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
  pub upstream_roles: BTreeSet<RoleId>,
  /// Context used when accumulated context is not applicable.
  pub input_context: String,
  /// Strict upstream roles that are not part of the plan.
  #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
  pub absent_upstream: BTreeSet<RoleId>,
}

/// A dependency-depth tier.
///
/// Steps in one tier have no role dependency on each other. In smart mode the
/// linear `depends_on` chain still runs through a tier, so its steps execute
/// in id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
  pub index: usize,
  pub step_ids: Vec<StepId>,
}

/// An ordered, one-shot execution plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
  pub task_text: String,
  pub mode: ExecutionMode,
  pub steps: Vec<ExecutionStep>,
  pub phases: Vec<Phase>,
}

impl ExecutionPlan {
  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  /// Get a step by ID.
  pub fn step(&self, id: StepId) -> Option<&ExecutionStep> {
    self.steps.iter().find(|s| s.id == id)
  }

  /// Step bound to a role, if scheduled.
  pub fn step_for_role(&self, role: RoleId) -> Option<&ExecutionStep> {
    self.steps.iter().find(|s| s.role == role)
  }

  /// Roles in plan order.
  pub fn roles(&self) -> Vec<RoleId> {
    self.steps.iter().map(|s| s.role).collect()
  }

  /// Keep only the first `max_steps` steps.
  ///
  /// A prefix of a topological order is still topological, so dependencies
  /// stay valid. Phases are trimmed to match.
  pub fn truncate(&mut self, max_steps: usize) -> Result<(), PlanError> {
    if max_steps == 0 {
      return Err(PlanError::InvalidInput(
        "max_steps must be greater than zero".to_string(),
      ));
    }
    if max_steps >= self.steps.len() {
      return Ok(());
    }

    self.steps.truncate(max_steps);
    let kept: BTreeSet<StepId> = self.steps.iter().map(|s| s.id).collect();

    for phase in &mut self.phases {
      phase.step_ids.retain(|id| kept.contains(id));
    }
    self.phases.retain(|phase| !phase.step_ids.is_empty());
    for (index, phase) in self.phases.iter_mut().enumerate() {
      phase.index = index;
    }

    Ok(())
  }

  /// Check the ordering invariant and phase coverage.
  pub fn validate(&self) -> Result<(), PlanError> {
    let mut seen = BTreeSet::new();

    for step in &self.steps {
      for dep in &step.depends_on {
        if !seen.contains(dep) {
          return Err(PlanError::InvalidPlan(format!(
            "step {} depends on step {} which does not appear earlier",
            step.id, dep
          )));
        }
      }
      if !seen.insert(step.id) {
        return Err(PlanError::InvalidPlan(format!("duplicate step id {}", step.id)));
      }
    }

    let mut phased = BTreeSet::new();
    for phase in &self.phases {
      for id in &phase.step_ids {
        if !seen.contains(id) || !phased.insert(*id) {
          return Err(PlanError::InvalidPlan(format!(
            "step {} is missing or repeated in phase {}",
            id, phase.index
          )));
        }
      }
    }
    if phased.len() != seen.len() {
      return Err(PlanError::InvalidPlan(
        "phases do not cover every step".to_string(),
      ));
    }

    Ok(())
  }
}
