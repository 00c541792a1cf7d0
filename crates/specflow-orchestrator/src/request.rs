use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use specflow_classifier::Classification;
use specflow_config::ExecutionMode;
use specflow_engine::WorkflowResult;
use specflow_roles::RoleId;

/// Orchestration request as accepted from the tool-dispatch layer.
///
/// ```json
/// {
///   "taskContent": "build a user authentication system with JWT",
///   "projectPath": "/work/app",
///   "executionMode": "smart",
///   "selectedRoles": ["requirements", "design"],
///   "contextSharing": true,
///   "maxSteps": 4
/// }
/// ```
///
/// Unset optional fields fall back to [`Settings`](specflow_config::Settings).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationRequest {
  /// Required. A missing field deserializes to empty and is rejected later.
  #[serde(default)]
  pub task_content: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub project_path: Option<PathBuf>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub execution_mode: Option<ExecutionMode>,
  /// Role ids as strings; unknown ids fail the request.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub selected_roles: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub context_sharing: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_steps: Option<usize>,
}

impl OrchestrationRequest {
  pub fn new(task_content: impl Into<String>) -> Self {
    Self {
      task_content: task_content.into(),
      ..Self::default()
    }
  }
}

/// Where a role document was persisted, or why it was not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
  pub role: RoleId,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub path: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

/// Everything an orchestration produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationOutcome {
  pub classification: Classification,
  pub result: WorkflowResult,
  /// Empty unless a project path was given.
  #[serde(default)]
  pub documents: Vec<DocumentRecord>,
}

impl OrchestrationOutcome {
  pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(self)
  }
}
