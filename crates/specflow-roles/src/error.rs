use thiserror::Error;

/// Errors that can occur when resolving roles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
  /// Role id is not known to the catalog.
  #[error("unknown role: {0}")]
  UnknownRole(String),

  /// The same role was declared twice in a catalog.
  #[error("duplicate role in catalog: {0}")]
  DuplicateRole(String),

  /// The role dependency table contains a cycle.
  #[error("cycle detected in role dependencies involving '{0}'")]
  CycleDetected(String),
}
