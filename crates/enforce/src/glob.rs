// SPDX-License-Identifier: MIT

//! Hand-rolled glob matcher for allowlist path globs.
//!
//! Deliberately minimal: `**` matches zero or more path segments (crosses
//! `/`), `*` matches within a single segment, everything else is literal.
//! This crate's allowlist globs are simple enough that pulling in a full
//! gitignore-style matcher would be more dependency than the job needs.

pub fn glob_match(pattern: &str, path: &str) -> bool {
    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();
    match_segments(&pattern_segments, &path_segments)
}

fn match_segments(pattern: &[&str], path: &[&str]) -> bool {
    match pattern.first() {
        None => path.is_empty(),
        Some(&"**") => {
            if pattern.len() == 1 {
                return true;
            }
            (0..=path.len()).any(|skip| match_segments(&pattern[1..], &path[skip..]))
        }
        Some(&head) => match path.first() {
            Some(&candidate) if segment_match(head, candidate) => match_segments(&pattern[1..], &path[1..]),
            _ => false,
        },
    }
}

/// Single-segment glob: `*` matches any run of characters within the segment.
fn segment_match(pattern: &str, segment: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == segment;
    }

    let mut rest = segment;
    for (i, part) in parts.iter().enumerate() {
        if i == 0 {
            if !rest.starts_with(part) {
                return false;
            }
            rest = &rest[part.len()..];
            continue;
        }
        if i == parts.len() - 1 {
            return rest.ends_with(part);
        }
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_star_crosses_directories() {
        assert!(glob_match("test/**", "test/unit/fixture.rs"));
        assert!(glob_match("test/**", "test/fixture.rs"));
        assert!(!glob_match("test/**", "src/fixture.rs"));
    }

    #[test]
    fn single_star_stays_within_a_segment() {
        assert!(glob_match("*.key", "secret.key"));
        assert!(!glob_match("*.key", "nested/secret.key"));
    }

    #[test]
    fn literal_segments_must_match_exactly() {
        assert!(glob_match("src/main.rs", "src/main.rs"));
        assert!(!glob_match("src/main.rs", "src/lib.rs"));
    }

    #[test]
    fn trailing_double_star_matches_the_root_itself() {
        assert!(glob_match("**", "anything/at/all"));
    }
}
