//! Document backend rendering role documents from templates.
//!
//! Each role gets a Markdown document built from one shared layout and a
//! role-specific list of sections. The template context is:
//!
//! ```json
//! {
//!   "role": "design",
//!   "task": "build a user authentication system with JWT",
//!   "responsibility": "...",
//!   "capabilities": ["architecture", "..."],
//!   "sections": ["Architecture", "..."],
//!   "upstream": ["requirements"],
//!   "context": "<received context>"
//! }
//! ```

use async_trait::async_trait;
use minijinja::{Environment, context};
use specflow_plan::ExecutionStep;
use specflow_roles::{RoleCatalog, RoleId};
use tracing::debug;

use crate::executor::{StepExecutor, StepOutcome};

const DOCUMENT_TEMPLATE: &str = r#"# {{ role | replace("-", " ") | title }} Document

**Task:** {{ task }}

**Responsibility:** {{ responsibility }}
{% if capabilities %}
**Capabilities:** {{ capabilities | join(", ") }}
{% endif %}
{% for section in sections %}
## {{ section }}

- {{ section }} for: {{ task }}
{% endfor %}
{% if upstream %}
## Builds On

{% for name in upstream %}- {{ name }}
{% endfor %}{% endif %}
## Received Context

{{ context }}
"#;

fn sections_for(role: RoleId) -> &'static [&'static str] {
  match role {
    RoleId::TaskManagement => &["Work Breakdown", "Milestones"],
    RoleId::Requirements => &["User Stories", "Acceptance Criteria", "Constraints"],
    RoleId::Design => &["Architecture", "Components", "Data Model"],
    RoleId::Coding => &["Implementation Plan", "Modules"],
    RoleId::Testing => &["Test Strategy", "Test Cases"],
    RoleId::SpecCoordination => &["Consistency Review", "Open Issues"],
  }
}

/// Renders a Markdown document per role.
pub struct TemplateExecutor {
  catalog: RoleCatalog,
  env: Environment<'static>,
}

impl TemplateExecutor {
  pub fn new(catalog: RoleCatalog) -> Self {
    Self {
      catalog,
      env: Environment::new(),
    }
  }

  /// Render the document for a step without going through the trait.
  pub fn render(&self, step: &ExecutionStep, received_context: &str) -> Result<String, String> {
    let descriptor = self.catalog.get(step.role).map_err(|e| e.to_string())?;

    let capabilities: Vec<&str> = descriptor
      .capability_tags
      .iter()
      .map(String::as_str)
      .collect();
    let upstream: Vec<&str> = step.upstream_roles.iter().map(|r| r.as_str()).collect();

    let ctx = context! {
      role => step.role.as_str(),
      task => step.input_context.trim(),
      responsibility => descriptor.responsibility.as_str(),
      capabilities => capabilities,
      sections => sections_for(step.role),
      upstream => upstream,
      context => received_context,
    };

    self
      .env
      .render_str(DOCUMENT_TEMPLATE, ctx)
      .map_err(|e| format!("failed to render {} document: {}", step.role, e))
  }
}

impl Default for TemplateExecutor {
  fn default() -> Self {
    Self::new(RoleCatalog::builtin())
  }
}

#[async_trait]
impl StepExecutor for TemplateExecutor {
  async fn execute(&self, step: &ExecutionStep, context: &str) -> StepOutcome {
    debug!(step_id = step.id, role = %step.role, "rendering_document");
    match self.render(step, context) {
      Ok(document) => StepOutcome::Succeeded(document),
      Err(message) => StepOutcome::Failed(message),
    }
  }
}
