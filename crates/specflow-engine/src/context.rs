use specflow_roles::RoleId;

/// Accumulated context threaded through a run.
///
/// Holds the task text plus every successful output so far, in the order the
/// steps resolved. Only the engine appends to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedContext {
  task_text: String,
  entries: Vec<(RoleId, String)>,
}

impl SharedContext {
  pub fn new(task_text: impl Into<String>) -> Self {
    Self {
      task_text: task_text.into(),
      entries: Vec::new(),
    }
  }

  pub fn push(&mut self, role: RoleId, output: impl Into<String>) {
    self.entries.push((role, output.into()));
  }

  pub fn contains(&self, role: RoleId) -> bool {
    self.entries.iter().any(|(r, _)| *r == role)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Task text followed by each output under a `--- role ---` label.
  pub fn render(&self) -> String {
    let mut out = self.task_text.clone();
    for (role, output) in &self.entries {
      out.push_str("\n\n--- ");
      out.push_str(role.as_str());
      out.push_str(" ---\n");
      out.push_str(output);
    }
    out
  }
}
