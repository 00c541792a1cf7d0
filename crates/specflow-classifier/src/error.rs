use thiserror::Error;

/// Errors that can occur during classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
  /// Task text was empty or whitespace.
  #[error("invalid input: {0}")]
  InvalidInput(String),
}
