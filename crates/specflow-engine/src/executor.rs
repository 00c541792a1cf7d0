//! Step executor seam.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use specflow_plan::{ExecutionStep, StepId};
use specflow_roles::RoleId;

/// What an executor reports for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
  Succeeded(String),
  Failed(String),
}

/// Performs the work of a single step.
///
/// The engine owns timeouts and cancellation; implementations only need to
/// produce an outcome for the given role and context.
#[async_trait]
pub trait StepExecutor: Send + Sync {
  async fn execute(&self, step: &ExecutionStep, context: &str) -> StepOutcome;
}

/// A call observed by [`ScriptedExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
  pub step_id: StepId,
  pub role: RoleId,
  pub context: String,
}

/// Deterministic executor with per-role scripted outcomes.
///
/// Roles without a script succeed with `"{role} output"`.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
  outcomes: HashMap<RoleId, StepOutcome>,
  delays: HashMap<RoleId, Duration>,
  default_delay: Option<Duration>,
  panics: Vec<RoleId>,
  calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedExecutor {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn succeed(mut self, role: RoleId, output: impl Into<String>) -> Self {
    self
      .outcomes
      .insert(role, StepOutcome::Succeeded(output.into()));
    self
  }

  pub fn fail(mut self, role: RoleId, message: impl Into<String>) -> Self {
    self.outcomes.insert(role, StepOutcome::Failed(message.into()));
    self
  }

  /// Sleep before answering for every role.
  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.default_delay = Some(delay);
    self
  }

  /// Sleep before answering for one role.
  pub fn with_role_delay(mut self, role: RoleId, delay: Duration) -> Self {
    self.delays.insert(role, delay);
    self
  }

  /// Panic when asked to run `role`.
  pub fn panic_on(mut self, role: RoleId) -> Self {
    self.panics.push(role);
    self
  }

  /// Calls received so far, in order.
  pub fn calls(&self) -> Vec<RecordedCall> {
    match self.calls.lock() {
      Ok(calls) => calls.clone(),
      Err(poisoned) => poisoned.into_inner().clone(),
    }
  }

  fn record(&self, step: &ExecutionStep, context: &str) {
    let call = RecordedCall {
      step_id: step.id,
      role: step.role,
      context: context.to_string(),
    };
    match self.calls.lock() {
      Ok(mut calls) => calls.push(call),
      Err(poisoned) => poisoned.into_inner().push(call),
    }
  }
}

#[async_trait]
impl StepExecutor for ScriptedExecutor {
  async fn execute(&self, step: &ExecutionStep, context: &str) -> StepOutcome {
    self.record(step, context);

    if let Some(delay) = self.delays.get(&step.role).copied().or(self.default_delay) {
      tokio::time::sleep(delay).await;
    }

    if self.panics.contains(&step.role) {
      panic!("scripted panic for role {}", step.role);
    }

    self
      .outcomes
      .get(&step.role)
      .cloned()
      .unwrap_or_else(|| StepOutcome::Succeeded(format!("{} output", step.role)))
  }
}
