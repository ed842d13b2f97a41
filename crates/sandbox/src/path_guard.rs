// SPDX-License-Identifier: MIT

//! Path-traversal rejection: every path a caller hands to a sandbox must
//! resolve inside the sandbox root.

use crate::error::SandboxError;
use std::path::{Path, PathBuf};

/// Resolve `relative` against `root`, rejecting any path that would escape
/// it (`..` segments, absolute paths, or symlinks pointing outside).
///
/// The target need not exist yet (callers may be about to create it), so
/// this walks up from the target to the nearest existing ancestor to
/// canonicalize, then re-appends the non-existent suffix.
pub fn resolve_within(root: &Path, relative: &Path) -> Result<PathBuf, SandboxError> {
    let canonical_root =
        root.canonicalize().map_err(|_| SandboxError::RootUnavailable(root.to_path_buf()))?;

    let joined = if relative.is_absolute() {
        // An absolute path is only legal if it's already inside the root.
        relative.to_path_buf()
    } else {
        canonical_root.join(relative)
    };

    let mut existing = joined.as_path();
    let mut suffix = PathBuf::new();
    let canonical_existing = loop {
        match existing.canonicalize() {
            Ok(c) => break c,
            Err(_) => {
                let Some(parent) = existing.parent() else {
                    return Err(SandboxError::PathEscape(joined));
                };
                if let Some(name) = existing.file_name() {
                    let mut rest = PathBuf::from(name);
                    rest.push(&suffix);
                    suffix = rest;
                }
                existing = parent;
            }
        }
    };

    let resolved = canonical_existing.join(&suffix);
    if !resolved.starts_with(&canonical_root) {
        return Err(SandboxError::PathEscape(joined));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn accepts_path_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_within(dir.path(), Path::new("src/main.rs")).unwrap();
        assert!(resolved.starts_with(dir.path().canonicalize().unwrap()));
    }

    #[test]
    fn rejects_dot_dot_escape() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_within(dir.path(), Path::new("../../etc/passwd")).unwrap_err();
        assert!(matches!(err, SandboxError::PathEscape(_)));
    }

    #[test]
    fn rejects_symlink_escape() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let link = dir.path().join("escape");
        #[cfg(unix)]
        std::os::unix::fs::symlink(outside.path(), &link).unwrap();
        let err = resolve_within(dir.path(), Path::new("escape/whatever")).unwrap_err();
        assert!(matches!(err, SandboxError::PathEscape(_)));
    }

    #[test]
    fn allows_nonexistent_target_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let resolved = resolve_within(dir.path(), Path::new("sub/new_file.txt")).unwrap();
        assert_eq!(resolved, dir.path().canonicalize().unwrap().join("sub/new_file.txt"));
    }
}
