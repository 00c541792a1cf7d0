//! Orchestration entry point.

use std::sync::Arc;

use specflow_classifier::TaskClassifier;
use specflow_config::Settings;
use specflow_engine::{
  EngineConfig, ExecutionNotifier, NoopNotifier, StepExecutor, TemplateExecutor, WorkflowEngine,
  WorkflowResult,
};
use specflow_plan::ExecutionPlanner;
use specflow_roles::{RoleCatalog, RoleId};
use specflow_sink::{DocumentSink, FsDocumentSink};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::error::OrchestrationError;
use crate::request::{DocumentRecord, OrchestrationOutcome, OrchestrationRequest};

/// Classifies a task, plans it, runs it and persists the documents.
pub struct Orchestrator<N: ExecutionNotifier = NoopNotifier> {
  settings: Settings,
  classifier: TaskClassifier,
  planner: ExecutionPlanner,
  engine: WorkflowEngine<N>,
  executor: Arc<dyn StepExecutor>,
}

impl Orchestrator<NoopNotifier> {
  /// Orchestrator over the built-in role catalog and document backend.
  pub fn new(settings: Settings) -> Result<Self, OrchestrationError> {
    Self::with_catalog(settings, RoleCatalog::builtin())
  }

  /// Orchestrator over a custom role catalog.
  pub fn with_catalog(settings: Settings, catalog: RoleCatalog) -> Result<Self, OrchestrationError> {
    settings.validate()?;

    let engine = WorkflowEngine::new(EngineConfig {
      step_timeout: settings.step_timeout(),
    });

    Ok(Self {
      classifier: TaskClassifier::new(settings.classifier),
      executor: Arc::new(TemplateExecutor::new(catalog.clone())),
      planner: ExecutionPlanner::new(catalog),
      engine,
      settings,
    })
  }
}

impl<N: ExecutionNotifier> Orchestrator<N> {
  /// Replace the step executor.
  pub fn with_executor(mut self, executor: Arc<dyn StepExecutor>) -> Self {
    self.executor = executor;
    self
  }

  /// Report engine events to `notifier`.
  pub fn with_notifier<M: ExecutionNotifier>(self, notifier: M) -> Orchestrator<M> {
    Orchestrator {
      engine: WorkflowEngine::with_notifier(self.engine.config().clone(), notifier),
      settings: self.settings,
      classifier: self.classifier,
      planner: self.planner,
      executor: self.executor,
    }
  }

  pub fn settings(&self) -> &Settings {
    &self.settings
  }

  pub fn catalog(&self) -> &RoleCatalog {
    self.planner.catalog()
  }

  /// Run a request to completion.
  pub async fn orchestrate(
    &self,
    request: OrchestrationRequest,
  ) -> Result<OrchestrationOutcome, OrchestrationError> {
    self
      .orchestrate_with_cancel(request, CancellationToken::new())
      .await
  }

  /// Run a request, stopping early when `cancel` fires.
  ///
  /// Pre-flight problems (missing task text, unknown roles, an empty role
  /// set, a zero step limit) fail the call. Once the plan exists the call
  /// always returns an outcome, whatever the individual steps did.
  #[instrument(name = "orchestrate", skip_all)]
  pub async fn orchestrate_with_cancel(
    &self,
    request: OrchestrationRequest,
    cancel: CancellationToken,
  ) -> Result<OrchestrationOutcome, OrchestrationError> {
    let task_text = request.task_content.trim();
    if task_text.is_empty() {
      return Err(OrchestrationError::InvalidInput(
        "taskContent is required".to_string(),
      ));
    }
    if request.max_steps == Some(0) {
      return Err(OrchestrationError::InvalidInput(
        "maxSteps must be greater than zero".to_string(),
      ));
    }

    let explicit = request
      .selected_roles
      .as_ref()
      .map(|names| parse_roles(names))
      .transpose()?;

    let descriptor = self.classifier.describe(task_text, explicit.as_deref())?;
    let classification = descriptor.classification;

    let mode = request.execution_mode.unwrap_or(self.settings.default_mode);
    let mut plan = self
      .planner
      .build_plan(task_text, classification.selected_roles(), mode)?;
    if let Some(max_steps) = request.max_steps {
      plan.truncate(max_steps)?;
    }

    info!(
      tier = %classification.complexity_tier,
      domains = ?classification.domain_tags,
      mode = %mode,
      steps = plan.len(),
      "orchestration_planned"
    );

    let context_sharing = request
      .context_sharing
      .unwrap_or(self.settings.context_sharing);
    let result = self
      .engine
      .run(plan, self.executor.as_ref(), context_sharing, cancel)
      .await;

    let documents = match &request.project_path {
      Some(project_path) => {
        let sink = FsDocumentSink::new(project_path.join(&self.settings.docs_dir));
        persist_documents(&sink, &result).await
      }
      None => Vec::new(),
    };

    Ok(OrchestrationOutcome {
      classification,
      result,
      documents,
    })
  }
}

fn parse_roles(names: &[String]) -> Result<Vec<RoleId>, OrchestrationError> {
  names
    .iter()
    .map(|name| name.parse::<RoleId>().map_err(OrchestrationError::from))
    .collect()
}

/// Persist every successful document. Failures are recorded, not raised.
async fn persist_documents(sink: &dyn DocumentSink, result: &WorkflowResult) -> Vec<DocumentRecord> {
  let mut records = Vec::new();

  for step in result.successes() {
    let record = match sink.persist(result.run_id, step.role, &step.output).await {
      Ok(path) => DocumentRecord {
        role: step.role,
        path: Some(path),
        error: None,
      },
      Err(e) => {
        warn!(role = %step.role, error = %e, "document_persist_failed");
        DocumentRecord {
          role: step.role,
          path: None,
          error: Some(e.to_string()),
        }
      }
    };
    records.push(record);
  }

  records
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_roles_accepts_aliases() {
    let roles = parse_roles(&["Requirements".to_string(), "coordination".to_string()]).unwrap();
    assert_eq!(roles, vec![RoleId::Requirements, RoleId::SpecCoordination]);
  }

  #[test]
  fn test_parse_roles_rejects_unknown() {
    let err = parse_roles(&["design".to_string(), "marketing".to_string()]).unwrap_err();
    assert!(matches!(err, OrchestrationError::Role(_)));
  }

  #[test]
  fn test_invalid_settings_rejected() {
    let mut settings = Settings::default();
    settings.docs_dir = String::new();
    assert!(matches!(
      Orchestrator::new(settings),
      Err(OrchestrationError::Settings(_))
    ));
  }
}
