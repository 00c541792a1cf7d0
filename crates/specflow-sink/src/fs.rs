use std::path::PathBuf;

use async_trait::async_trait;
use specflow_roles::RoleId;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{DocumentSink, SinkError};

/// Filesystem-based document sink.
///
/// Each document is stored at `{base_path}/{run_id}/{role}.md`. Parent
/// directories are created automatically. Content is written to a temporary
/// file in the same directory and hard-linked into place, so readers never
/// see a partial document and an existing document is never replaced.
pub struct FsDocumentSink {
  base_path: PathBuf,
}

impl FsDocumentSink {
  /// Create a new filesystem sink rooted at `base_path`.
  pub fn new(base_path: impl Into<PathBuf>) -> Self {
    Self {
      base_path: base_path.into(),
    }
  }

  pub fn base_path(&self) -> &PathBuf {
    &self.base_path
  }

  /// Path a document is stored at.
  ///
  /// The path is claimed with `hard_link`, which fails when the target exists.
  /// Of two concurrent writers with different content exactly one wins.
  pub fn document_path(&self, run_id: Uuid, role: RoleId) -> PathBuf {
    self
      .base_path
      .join(run_id.to_string())
      .join(format!("{}.md", role.as_str()))
  }

  async fn read_existing(&self, path: &PathBuf) -> Result<Option<String>, SinkError> {
    match fs::read_to_string(path).await {
      Ok(content) => Ok(Some(content)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(SinkError::Io(e)),
    }
  }
}

#[async_trait]
impl DocumentSink for FsDocumentSink {
  async fn persist(
    &self,
    run_id: Uuid,
    role: RoleId,
    content: &str,
  ) -> Result<PathBuf, SinkError> {
    let path = self.document_path(run_id, role);

    let Some(parent) = path.parent() else {
      return Err(SinkError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("document path has no parent: {}", path.display()),
      )));
    };
    fs::create_dir_all(parent).await?;

    let tmp_path = parent.join(format!(".{}.{}.tmp", role.as_str(), Uuid::new_v4()));
    let written = async {
      let mut file = File::create(&tmp_path).await?;
      file.write_all(content.as_bytes()).await?;
      file.flush().await?;
      file.sync_all().await
    }
    .await;

    let linked = match written {
      Ok(()) => fs::hard_link(&tmp_path, &path).await,
      Err(e) => Err(e),
    };

    // The temp file goes on every path
    match fs::remove_file(&tmp_path).await {
      Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
        warn!(path = %tmp_path.display(), error = %e, "temp_cleanup_failed");
      }
      _ => {}
    }

    match linked {
      Ok(()) => {
        debug!(path = %path.display(), bytes = content.len(), "document_persisted");
        Ok(path)
      }
      Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
        match self.read_existing(&path).await? {
          Some(existing) if existing == content => {
            debug!(path = %path.display(), "document_unchanged");
            Ok(path)
          }
          _ => {
            warn!(path = %path.display(), "document_conflict");
            Err(SinkError::Conflict { run_id, role })
          }
        }
      }
      Err(e) => Err(SinkError::Io(e)),
    }
  }

  async fn load(&self, run_id: Uuid, role: RoleId) -> Result<String, SinkError> {
    let path = self.document_path(run_id, role);
    self
      .read_existing(&path)
      .await?
      .ok_or(SinkError::NotFound { run_id, role })
  }
}
