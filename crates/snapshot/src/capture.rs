// SPDX-License-Identifier: MIT

//! Content-addressed workspace snapshots over a git-backed workspace.

use crate::error::SnapshotError;
use crate::git;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A pair of fingerprints plus the diff stats between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub before_sha: String,
    pub after_sha: String,
    pub files_changed: u32,
    pub insertions: u32,
    pub deletions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    pub workspace_path: PathBuf,
    pub captured_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn is_unchanged(&self) -> bool {
        self.before_sha == self.after_sha
    }
}

/// Options controlling one [`capture`] call.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureOptions {
    /// Capture and attach the full diff text (can be large; off by default).
    pub include_diff_text: bool,
}

/// Stage all changes, commit if there is a diff, and return the resulting
/// fingerprint pair. Deterministic: the same workspace contents over the
/// same prior HEAD always yield the same `after_sha` (see [`git::commit_snapshot`]).
pub async fn capture(workspace_root: &Path, now: DateTime<Utc>) -> Result<Snapshot, SnapshotError> {
    capture_with(workspace_root, now, CaptureOptions::default()).await
}

pub async fn capture_with(
    workspace_root: &Path,
    now: DateTime<Utc>,
    opts: CaptureOptions,
) -> Result<Snapshot, SnapshotError> {
    let before_sha = git::rev_parse_head(workspace_root).await?;
    git::add_all(workspace_root).await?;

    if !git::has_staged_changes(workspace_root).await? {
        return Ok(Snapshot {
            before_sha: before_sha.clone(),
            after_sha: before_sha,
            files_changed: 0,
            insertions: 0,
            deletions: 0,
            diff: None,
            workspace_path: workspace_root.to_path_buf(),
            captured_at: now,
        });
    }

    let (files_changed, insertions, deletions) = git::cached_numstat(workspace_root).await?;
    let diff = if opts.include_diff_text { Some(git::cached_diff_text(workspace_root).await?) } else { None };
    let after_sha = git::commit_snapshot(workspace_root).await?;

    Ok(Snapshot {
        before_sha,
        after_sha,
        files_changed,
        insertions,
        deletions,
        diff,
        workspace_path: workspace_root.to_path_buf(),
        captured_at: now,
    })
}

/// Per-file blob hashes at `HEAD`, keyed by repo-relative path. Used by the
/// convergence controller's loop detector to fingerprint an iteration more
/// precisely than the single commit sha allows.
pub async fn file_hashes(workspace_root: &Path) -> Result<std::collections::BTreeMap<String, String>, SnapshotError> {
    git::file_hashes(workspace_root).await
}

/// Initializes a brand-new workspace's git history with an empty initial
/// commit, so its first snapshot has a parent to diff against.
pub async fn init_workspace_history(workspace_root: &Path, message: &str) -> Result<(), SnapshotError> {
    git::init_with_initial_commit(workspace_root, message).await
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
