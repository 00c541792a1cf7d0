use specflow_roles::RoleError;
use thiserror::Error;

/// Errors that can occur while building or reshaping a plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
  /// No roles were given, so there is nothing to schedule.
  #[error("no roles to schedule")]
  EmptyRoleSet,

  /// A planning argument was out of range.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// A plan broke the ordering invariant.
  #[error("invalid plan: {0}")]
  InvalidPlan(String),

  /// Role resolution failed.
  #[error(transparent)]
  Role(#[from] RoleError),
}
