// SPDX-License-Identifier: MIT

//! Glob matching for forbidden-pattern and naming-convention rules, honoring
//! the workspace `.gitignore` as additional excludes.

use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// All non-ignored file paths under `root`, relative to `root`.
pub fn walk_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for entry in WalkBuilder::new(root).hidden(false).build().flatten() {
        let is_file = entry.file_type().map(|ft| ft.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            out.push(relative.to_path_buf());
        }
    }
    out
}

/// Builds a glob matcher over `patterns` (gitignore-style, `**` crosses
/// directories, `*` does not).
pub fn build_matcher(root: &Path, patterns: &[String]) -> Option<Override> {
    if patterns.is_empty() {
        return None;
    }
    let mut builder = OverrideBuilder::new(root);
    for pattern in patterns {
        if builder.add(pattern).is_err() {
            continue;
        }
    }
    builder.build().ok()
}

pub fn pattern_matches(matcher: &Override, relative_path: &Path) -> bool {
    matches!(matcher.matched(relative_path, false), ignore::Match::Whitelist(_))
}
