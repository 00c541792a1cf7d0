//! Step error types.
//!
//! Step errors are never returned from the engine; they are rendered into
//! [`StepResult::error`](crate::StepResult) so the run can continue.

use specflow_roles::RoleId;

/// Reasons a step did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
  /// The executor reported a failure.
  #[error("step execution failed: {0}")]
  ExecutionFailure(String),

  /// The executor did not return within the step timeout.
  #[error("step timed out after {timeout_ms} ms")]
  Timeout { timeout_ms: u64 },

  /// The run was cancelled while the step was executing.
  #[error("step cancelled")]
  Cancelled,

  /// The run was cancelled before the step started.
  #[error("step skipped: run cancelled before it started")]
  Skipped,

  /// An upstream step this step builds on did not succeed.
  #[error("upstream output unavailable for role '{role}'")]
  DependencyUnavailable { role: RoleId },
}
