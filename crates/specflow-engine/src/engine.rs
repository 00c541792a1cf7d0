//! Workflow engine.
//!
//! Runs every step of a plan in declared order, threading the shared context
//! through successful outputs. A failing step never aborts the run; its error
//! is recorded and the next step starts.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use specflow_plan::{ExecutionPlan, ExecutionStep};
use specflow_roles::RoleId;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::consolidate::{consolidate, overall_status};
use crate::context::SharedContext;
use crate::error::StepError;
use crate::events::{ExecutionEvent, ExecutionNotifier, NoopNotifier};
use crate::executor::{StepExecutor, StepOutcome};
use crate::result::{StepResult, StepStatus, WorkflowResult};

/// Engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
  /// Upper bound for a single executor call. `None` waits indefinitely.
  pub step_timeout: Option<Duration>,
}

/// Executes plans one step at a time.
pub struct WorkflowEngine<N: ExecutionNotifier = NoopNotifier> {
  config: EngineConfig,
  notifier: N,
}

impl WorkflowEngine<NoopNotifier> {
  pub fn new(config: EngineConfig) -> Self {
    Self {
      config,
      notifier: NoopNotifier,
    }
  }
}

impl Default for WorkflowEngine<NoopNotifier> {
  fn default() -> Self {
    Self::new(EngineConfig::default())
  }
}

impl<N: ExecutionNotifier> WorkflowEngine<N> {
  /// Create an engine that reports progress to `notifier`.
  pub fn with_notifier(config: EngineConfig, notifier: N) -> Self {
    Self { config, notifier }
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// Run a plan to completion under a fresh run id.
  ///
  /// Always returns a result with exactly one [`StepResult`] per plan step.
  /// Once `cancel` fires, the in-flight step is recorded as cancelled and the
  /// remaining steps as skipped.
  pub async fn run(
    &self,
    plan: ExecutionPlan,
    executor: &dyn StepExecutor,
    context_sharing: bool,
    cancel: CancellationToken,
  ) -> WorkflowResult {
    self
      .run_with_id(Uuid::new_v4(), plan, executor, context_sharing, cancel)
      .await
  }

  /// Run a plan under a caller-chosen run id.
  #[instrument(
    name = "workflow_run",
    skip(self, run_id, plan, executor, cancel),
    fields(
      run_id = %run_id,
      mode = %plan.mode,
      steps = plan.steps.len(),
    )
  )]
  pub async fn run_with_id(
    &self,
    run_id: Uuid,
    plan: ExecutionPlan,
    executor: &dyn StepExecutor,
    context_sharing: bool,
    cancel: CancellationToken,
  ) -> WorkflowResult {
    let run_start = Instant::now();
    let total_steps = plan.steps.len();

    info!(total_steps, context_sharing, "workflow_started");
    self.notifier.notify(ExecutionEvent::WorkflowStarted {
      run_id,
      total_steps,
    });

    let mut shared = SharedContext::new(plan.task_text.clone());
    let mut results = Vec::with_capacity(total_steps);

    for step in &plan.steps {
      if cancel.is_cancelled() {
        let result = skipped_result(step);
        info!(step_id = step.id, role = %step.role, "step_skipped");
        self.notify_finished(run_id, &result);
        results.push(result);
        continue;
      }

      let use_shared = context_sharing && step.absent_upstream.is_empty();
      let context = if use_shared {
        shared.render()
      } else {
        step.input_context.clone()
      };

      let unavailable: Vec<RoleId> = if use_shared {
        step
          .upstream_roles
          .iter()
          .filter(|role| !shared.contains(**role))
          .copied()
          .collect()
      } else {
        Vec::new()
      };
      for role in &unavailable {
        let err = StepError::DependencyUnavailable { role: *role };
        warn!(step_id = step.id, role = %step.role, error = %err, "dependency_unavailable");
      }

      info!(step_id = step.id, role = %step.role, "step_started");
      self.notifier.notify(ExecutionEvent::StepStarted {
        run_id,
        step_id: step.id,
        role: step.role,
      });

      let started_at = Utc::now();
      let step_start = Instant::now();
      let outcome = self.execute_step(step, &context, executor, &cancel).await;
      let duration_ms = step_start.elapsed().as_millis() as u64;

      let (status, output, error) = match outcome {
        Ok(output) => {
          info!(step_id = step.id, role = %step.role, duration_ms, "step_succeeded");
          if context_sharing {
            shared.push(step.role, output.clone());
          }
          (StepStatus::Success, output, None)
        }
        Err(err) => {
          let status = match err {
            StepError::Timeout { .. } | StepError::Cancelled => StepStatus::Cancelled,
            _ => StepStatus::Failed,
          };
          warn!(step_id = step.id, role = %step.role, error = %err, "step_failed");
          (status, String::new(), Some(err.to_string()))
        }
      };

      let result = StepResult {
        step_id: step.id,
        role: step.role,
        status,
        output,
        started_at,
        finished_at: Utc::now(),
        duration_ms,
        error,
        unavailable_dependencies: unavailable,
      };
      self.notify_finished(run_id, &result);
      results.push(result);
    }

    let consolidated_output = consolidate(&results);
    let overall_status = overall_status(&results);
    let total_duration_ms = run_start.elapsed().as_millis() as u64;

    info!(
      status = ?overall_status,
      total_duration_ms,
      "workflow_finished"
    );
    self.notifier.notify(ExecutionEvent::WorkflowFinished {
      run_id,
      status: overall_status,
      total_duration_ms,
    });

    WorkflowResult {
      run_id,
      plan,
      results,
      consolidated_output,
      overall_status,
      total_duration_ms,
    }
  }

  /// Call the executor under the step timeout and the cancellation token.
  ///
  /// A panicking executor is reported as an execution failure.
  async fn execute_step(
    &self,
    step: &ExecutionStep,
    context: &str,
    executor: &dyn StepExecutor,
    cancel: &CancellationToken,
  ) -> Result<String, StepError> {
    let call = AssertUnwindSafe(executor.execute(step, context)).catch_unwind();

    let bounded = async {
      match self.config.step_timeout {
        Some(limit) => tokio::time::timeout(limit, call)
          .await
          .map_err(|_| StepError::Timeout {
            timeout_ms: limit.as_millis() as u64,
          }),
        None => Ok(call.await),
      }
    };

    let caught = tokio::select! {
      biased;
      _ = cancel.cancelled() => return Err(StepError::Cancelled),
      caught = bounded => caught?,
    };

    match caught {
      Ok(StepOutcome::Succeeded(output)) => Ok(output),
      Ok(StepOutcome::Failed(message)) => Err(StepError::ExecutionFailure(message)),
      Err(payload) => Err(StepError::ExecutionFailure(panic_message(payload))),
    }
  }

  fn notify_finished(&self, run_id: Uuid, result: &StepResult) {
    self.notifier.notify(ExecutionEvent::StepFinished {
      run_id,
      step_id: result.step_id,
      role: result.role,
      status: result.status,
      error: result.error.clone(),
    });
  }
}

fn skipped_result(step: &ExecutionStep) -> StepResult {
  let now = Utc::now();
  StepResult {
    step_id: step.id,
    role: step.role,
    status: StepStatus::Skipped,
    output: String::new(),
    started_at: now,
    finished_at: now,
    duration_ms: 0,
    error: Some(StepError::Skipped.to_string()),
    unavailable_dependencies: Vec::new(),
  }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    format!("executor panicked: {message}")
  } else if let Some(message) = payload.downcast_ref::<String>() {
    format!("executor panicked: {message}")
  } else {
    "executor panicked".to_string()
  }
}
