use super::*;
use std::time::Duration;

async fn sandbox_in(dir: &std::path::Path) -> Box<dyn Sandbox> {
    SubprocessSandboxProvider.acquire(dir.to_path_buf()).await.unwrap()
}

#[tokio::test]
async fn executes_a_command_and_captures_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_in(dir.path()).await;
    let result = sandbox
        .execute(ExecRequest::new("echo", Duration::from_secs(5)).arg("hello"))
        .await
        .unwrap();
    assert!(result.success());
    assert_eq!(result.stdout.trim(), "hello");
}

#[tokio::test]
async fn kills_a_command_that_exceeds_its_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_in(dir.path()).await;
    let result = sandbox
        .execute(ExecRequest::new("sleep", Duration::from_millis(50)).arg("5"))
        .await
        .unwrap();
    assert!(result.timed_out);
    assert!(!result.success());
}

#[tokio::test]
async fn write_then_read_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_in(dir.path()).await;
    sandbox.write_file(Path::new("nested/output.txt"), b"content").await.unwrap();
    let read_back = sandbox.read_file(Path::new("nested/output.txt")).await.unwrap();
    assert_eq!(read_back, b"content");
}

#[tokio::test]
async fn rejects_path_traversal_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_in(dir.path()).await;
    let err = sandbox.write_file(Path::new("../../etc/passwd"), b"x").await.unwrap_err();
    assert!(matches!(err, SandboxError::PathEscape(_)));
}

#[tokio::test]
async fn lists_files_recursively() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_in(dir.path()).await;
    sandbox.write_file(Path::new("a.txt"), b"1").await.unwrap();
    sandbox.write_file(Path::new("sub/b.txt"), b"2").await.unwrap();
    let mut files: Vec<_> = sandbox
        .list_files(Path::new("."))
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, vec!["a.txt", "b.txt"]);
}

#[tokio::test]
async fn destroy_is_idempotent_and_blocks_further_use() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_in(dir.path()).await;
    sandbox.destroy().await.unwrap();
    sandbox.destroy().await.unwrap();
    let err = sandbox.read_file(Path::new("a.txt")).await.unwrap_err();
    assert!(matches!(err, SandboxError::Destroyed));
}

#[tokio::test]
async fn acquire_rejects_missing_root() {
    let missing = std::path::PathBuf::from("/nonexistent/agentgate-sandbox-fixture");
    let err = SubprocessSandboxProvider.acquire(missing).await.unwrap_err();
    assert!(matches!(err, SandboxError::RootUnavailable(_)));
}
