//! Specflow Sink
//!
//! This crate provides the document sink trait and a filesystem
//! implementation. A sink persists the document a role produced during a run.
//!
//! Documents are keyed by `(run_id, role)`. Writing the same content twice for
//! a key is accepted; writing different content is a conflict.

mod fs;

pub use fs::FsDocumentSink;

use std::path::PathBuf;

use async_trait::async_trait;
use specflow_roles::RoleId;
use uuid::Uuid;

/// Error type for document sink operations.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
  /// A different document is already stored under this key.
  #[error("document for role '{role}' in run {run_id} already exists with different content")]
  Conflict { run_id: Uuid, role: RoleId },

  /// The requested document was not found.
  #[error("document for role '{role}' in run {run_id} not found")]
  NotFound { run_id: Uuid, role: RoleId },

  /// An I/O error occurred.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Document storage trait.
#[async_trait]
pub trait DocumentSink: Send + Sync {
  /// Store a role document and return where it landed.
  async fn persist(&self, run_id: Uuid, role: RoleId, content: &str)
  -> Result<PathBuf, SinkError>;

  /// Read a stored role document.
  async fn load(&self, run_id: Uuid, role: RoleId) -> Result<String, SinkError>;
}
