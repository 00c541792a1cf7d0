//! Execution result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use specflow_plan::{ExecutionPlan, StepId};
use specflow_roles::RoleId;
use uuid::Uuid;

/// Outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
  Success,
  Failed,
  /// Never started because the run was cancelled.
  Skipped,
  /// Started but timed out or was cancelled mid-flight.
  Cancelled,
}

/// Aggregate outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
  /// Every step succeeded.
  Completed,
  /// At least one step succeeded and at least one did not.
  Partial,
  /// No step succeeded.
  Failed,
}

/// Result of a single step. Written exactly once per step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
  pub step_id: StepId,
  pub role: RoleId,
  pub status: StepStatus,
  /// Executor output. Empty unless the step succeeded.
  pub output: String,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
  pub duration_ms: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  /// Upstream roles whose output was expected in the shared context but did
  /// not succeed.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub unavailable_dependencies: Vec<RoleId>,
}

impl StepResult {
  pub fn is_success(&self) -> bool {
    self.status == StepStatus::Success
  }
}

/// Result of a complete workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResult {
  pub run_id: Uuid,
  pub plan: ExecutionPlan,
  /// One entry per plan step, in plan order.
  pub results: Vec<StepResult>,
  pub consolidated_output: String,
  pub overall_status: OverallStatus,
  pub total_duration_ms: u64,
}

impl WorkflowResult {
  /// Result for a role, if the role was scheduled.
  pub fn result_for(&self, role: RoleId) -> Option<&StepResult> {
    self.results.iter().find(|r| r.role == role)
  }

  /// Successful results, in plan order.
  pub fn successes(&self) -> impl Iterator<Item = &StepResult> {
    self.results.iter().filter(|r| r.is_success())
  }
}
