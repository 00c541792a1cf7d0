use specflow_classifier::ClassifyError;
use specflow_config::SettingsError;
use specflow_plan::PlanError;
use specflow_roles::RoleError;

/// Errors that stop an orchestration before any step runs.
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error(transparent)]
  Role(#[from] RoleError),

  #[error(transparent)]
  Classify(#[from] ClassifyError),

  #[error(transparent)]
  Plan(#[from] PlanError),

  #[error("invalid settings: {0}")]
  Settings(#[from] SettingsError),
}
