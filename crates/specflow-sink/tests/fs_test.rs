use specflow_roles::RoleId;
use specflow_sink::{DocumentSink, FsDocumentSink, SinkError};
use uuid::Uuid;

#[tokio::test]
async fn test_persist_writes_role_document() {
  let dir = tempfile::tempdir().unwrap();
  let sink = FsDocumentSink::new(dir.path());
  let run_id = Uuid::new_v4();

  let path = sink
    .persist(run_id, RoleId::Requirements, "# Requirements")
    .await
    .unwrap();

  assert_eq!(
    path,
    dir.path().join(run_id.to_string()).join("requirements.md")
  );
  assert_eq!(
    tokio::fs::read_to_string(&path).await.unwrap(),
    "# Requirements"
  );
  assert_eq!(
    sink.load(run_id, RoleId::Requirements).await.unwrap(),
    "# Requirements"
  );
}

#[tokio::test]
async fn test_same_content_is_idempotent() {
  let dir = tempfile::tempdir().unwrap();
  let sink = FsDocumentSink::new(dir.path());
  let run_id = Uuid::new_v4();

  let first = sink.persist(run_id, RoleId::Design, "doc").await.unwrap();
  let second = sink.persist(run_id, RoleId::Design, "doc").await.unwrap();
  assert_eq!(first, second);
}

#[tokio::test]
async fn test_different_content_conflicts_and_keeps_original() {
  let dir = tempfile::tempdir().unwrap();
  let sink = FsDocumentSink::new(dir.path());
  let run_id = Uuid::new_v4();

  sink.persist(run_id, RoleId::Coding, "v1").await.unwrap();
  let err = sink.persist(run_id, RoleId::Coding, "v2").await.unwrap_err();

  assert!(matches!(
    err,
    SinkError::Conflict {
      role: RoleId::Coding,
      ..
    }
  ));
  assert_eq!(sink.load(run_id, RoleId::Coding).await.unwrap(), "v1");
}

#[tokio::test]
async fn test_runs_are_isolated() {
  let dir = tempfile::tempdir().unwrap();
  let sink = FsDocumentSink::new(dir.path());

  sink
    .persist(Uuid::new_v4(), RoleId::Testing, "a")
    .await
    .unwrap();
  sink
    .persist(Uuid::new_v4(), RoleId::Testing, "b")
    .await
    .unwrap();
}

#[tokio::test]
async fn test_no_temp_files_left_behind() {
  let dir = tempfile::tempdir().unwrap();
  let sink = FsDocumentSink::new(dir.path());
  let run_id = Uuid::new_v4();

  sink.persist(run_id, RoleId::Testing, "doc").await.unwrap();

  let names: Vec<String> = std::fs::read_dir(dir.path().join(run_id.to_string()))
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  assert_eq!(names, vec!["testing.md".to_string()]);
}

#[tokio::test]
async fn test_load_missing_is_not_found() {
  let dir = tempfile::tempdir().unwrap();
  let sink = FsDocumentSink::new(dir.path());

  let err = sink
    .load(Uuid::new_v4(), RoleId::Design)
    .await
    .unwrap_err();
  assert!(matches!(err, SinkError::NotFound { .. }));
}

#[tokio::test]
async fn test_concurrent_writers_never_overwrite() {
  let dir = tempfile::tempdir().unwrap();
  let first = FsDocumentSink::new(dir.path());
  let second = FsDocumentSink::new(dir.path());
  let run_id = Uuid::new_v4();

  let (a, b) = tokio::join!(
    first.persist(run_id, RoleId::Design, "from first"),
    second.persist(run_id, RoleId::Design, "from second"),
  );

  let stored = first.load(run_id, RoleId::Design).await.unwrap();
  match (a, b) {
    (Ok(_), Err(SinkError::Conflict { .. })) => assert_eq!(stored, "from first"),
    (Err(SinkError::Conflict { .. }), Ok(_)) => assert_eq!(stored, "from second"),
    other => panic!("expected exactly one writer to win, got {other:?}"),
  }
}

#[tokio::test]
async fn test_failed_write_removes_temp_file() {
  let dir = tempfile::tempdir().unwrap();
  let sink = FsDocumentSink::new(dir.path());
  let run_id = Uuid::new_v4();

  // A directory squatting on the document path makes the write fail
  let run_dir = dir.path().join(run_id.to_string());
  std::fs::create_dir_all(run_dir.join("coding.md")).unwrap();

  let err = sink.persist(run_id, RoleId::Coding, "doc").await.unwrap_err();
  assert!(matches!(err, SinkError::Io(_)));

  let names: Vec<String> = std::fs::read_dir(&run_dir)
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  assert_eq!(names, vec!["coding.md".to_string()]);
}
