// SPDX-License-Identifier: MIT

//! Thin wrapper over the system `git` binary used to capture snapshots.

use crate::error::SnapshotError;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;

/// Fixed author/committer identity and timestamp used for every synthetic
/// snapshot commit, so that identical tree contents over the same parent
/// always produce the same commit sha (spec §4.3 determinism invariant).
const SNAPSHOT_AUTHOR_NAME: &str = "agentgate";
const SNAPSHOT_AUTHOR_EMAIL: &str = "agentgate@localhost";
const SNAPSHOT_TIMESTAMP: &str = "1970-01-01T00:00:00Z";
const SNAPSHOT_COMMIT_MESSAGE: &str = "agentgate snapshot";

pub(crate) async fn run(repo_root: &Path, args: &[&str]) -> Result<Output, SnapshotError> {
    let mut cmd = Command::new("git");
    cmd.arg("-C")
        .arg(repo_root)
        .args(args)
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE");
    cmd.output().await.map_err(SnapshotError::Spawn)
}

pub(crate) async fn run_ok(repo_root: &Path, command_label: &str, args: &[&str]) -> Result<String, SnapshotError> {
    let output = run(repo_root, args).await?;
    if !output.status.success() {
        return Err(SnapshotError::CommandFailed {
            command: command_label.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    String::from_utf8(output.stdout).map(|s| s.trim().to_string()).map_err(|_| SnapshotError::Utf8)
}

pub(crate) async fn rev_parse_head(repo_root: &Path) -> Result<String, SnapshotError> {
    run_ok(repo_root, "git rev-parse HEAD", &["rev-parse", "HEAD"]).await
}

pub(crate) async fn add_all(repo_root: &Path) -> Result<(), SnapshotError> {
    run_ok(repo_root, "git add -A", &["add", "-A"]).await.map(|_| ())
}

/// `true` if there is staged content different from HEAD.
pub(crate) async fn has_staged_changes(repo_root: &Path) -> Result<bool, SnapshotError> {
    let output = run(repo_root, &["diff", "--cached", "--quiet"]).await?;
    match output.status.code() {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        _ => Err(SnapshotError::CommandFailed {
            command: "git diff --cached --quiet".to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }),
    }
}

/// Parses `git diff --cached --numstat` into (filesChanged, insertions, deletions).
pub(crate) async fn cached_numstat(repo_root: &Path) -> Result<(u32, u32, u32), SnapshotError> {
    let body = run_ok(repo_root, "git diff --cached --numstat", &["diff", "--cached", "--numstat"]).await?;
    let mut files = 0u32;
    let mut insertions = 0u32;
    let mut deletions = 0u32;
    for line in body.lines().filter(|l| !l.trim().is_empty()) {
        let mut parts = line.split_whitespace();
        let added = parts.next().unwrap_or("0");
        let removed = parts.next().unwrap_or("0");
        files += 1;
        insertions += added.parse::<u32>().unwrap_or(0);
        deletions += removed.parse::<u32>().unwrap_or(0);
    }
    Ok((files, insertions, deletions))
}

pub(crate) async fn cached_diff_text(repo_root: &Path) -> Result<String, SnapshotError> {
    run_ok(repo_root, "git diff --cached", &["diff", "--cached"]).await
}

/// Commits staged changes with a fixed author/committer/timestamp/message.
pub(crate) async fn commit_snapshot(repo_root: &Path) -> Result<String, SnapshotError> {
    let mut cmd = Command::new("git");
    cmd.arg("-C")
        .arg(repo_root)
        .args(["commit", "--no-gpg-sign", "-m", SNAPSHOT_COMMIT_MESSAGE])
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE")
        .env("GIT_AUTHOR_NAME", SNAPSHOT_AUTHOR_NAME)
        .env("GIT_AUTHOR_EMAIL", SNAPSHOT_AUTHOR_EMAIL)
        .env("GIT_AUTHOR_DATE", SNAPSHOT_TIMESTAMP)
        .env("GIT_COMMITTER_NAME", SNAPSHOT_AUTHOR_NAME)
        .env("GIT_COMMITTER_EMAIL", SNAPSHOT_AUTHOR_EMAIL)
        .env("GIT_COMMITTER_DATE", SNAPSHOT_TIMESTAMP);
    let output = cmd.output().await.map_err(SnapshotError::Spawn)?;
    if !output.status.success() {
        return Err(SnapshotError::CommandFailed {
            command: "git commit".to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    rev_parse_head(repo_root).await
}

/// Parses `git ls-tree -r HEAD` into path → blob sha, for the loop
/// detector's per-file fingerprint.
pub(crate) async fn file_hashes(repo_root: &Path) -> Result<std::collections::BTreeMap<String, String>, SnapshotError> {
    let body = run_ok(repo_root, "git ls-tree -r HEAD", &["ls-tree", "-r", "HEAD"]).await?;
    let mut hashes = std::collections::BTreeMap::new();
    for line in body.lines().filter(|l| !l.trim().is_empty()) {
        let Some((meta, path)) = line.split_once('\t') else { continue };
        let Some(sha) = meta.split_whitespace().nth(2) else { continue };
        hashes.insert(path.to_string(), sha.to_string());
    }
    Ok(hashes)
}

/// Initializes a fresh repo with an empty initial commit, so the first
/// snapshot always has a parent (spec §3 Workspace invariant).
pub(crate) async fn init_with_initial_commit(repo_root: &Path, message: &str) -> Result<(), SnapshotError> {
    run_ok(repo_root, "git init", &["init"]).await?;
    let mut cmd = Command::new("git");
    cmd.arg("-C")
        .arg(repo_root)
        .args(["commit", "--no-gpg-sign", "--allow-empty", "-m", message])
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE")
        .env("GIT_AUTHOR_NAME", SNAPSHOT_AUTHOR_NAME)
        .env("GIT_AUTHOR_EMAIL", SNAPSHOT_AUTHOR_EMAIL)
        .env("GIT_AUTHOR_DATE", SNAPSHOT_TIMESTAMP)
        .env("GIT_COMMITTER_NAME", SNAPSHOT_AUTHOR_NAME)
        .env("GIT_COMMITTER_EMAIL", SNAPSHOT_AUTHOR_EMAIL)
        .env("GIT_COMMITTER_DATE", SNAPSHOT_TIMESTAMP);
    let output = cmd.output().await.map_err(SnapshotError::Spawn)?;
    if !output.status.success() {
        return Err(SnapshotError::CommandFailed {
            command: "git commit --allow-empty".to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}
