// SPDX-License-Identifier: MIT

//! Merges findings across detectors, applies the allowlist, and classifies
//! the result by sensitivity -> action (spec §4.5).

use crate::glob::glob_match;
use crate::report::{action_for, Action, EnforcementReport, Summary};
use agentgate_core::{AllowlistEntry, Finding};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::time::Duration;

fn is_allowlisted(finding: &Finding, allowlist: &[AllowlistEntry], today: NaiveDate) -> bool {
    allowlist
        .iter()
        .any(|entry| glob_match(&entry.path_glob, &finding.file) && !entry.is_expired(today) && entry.covers_detector(&finding.detector))
}

/// Aggregate `findings` against `allowlist`, evaluated as of `today`.
///
/// `scan_duration` and `files_scanned` are carried through into the summary
/// verbatim — the aggregator itself does not measure or walk anything.
pub fn aggregate(
    findings: &[Finding],
    allowlist: &[AllowlistEntry],
    today: NaiveDate,
    scan_duration: Duration,
    files_scanned: u64,
) -> EnforcementReport {
    let mut blocked = Vec::new();
    let mut warned = Vec::new();
    let mut logged = Vec::new();
    let mut allowlisted = Vec::new();
    let mut by_level: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_detector: BTreeMap<String, usize> = BTreeMap::new();

    let mut filtered = Vec::with_capacity(findings.len());
    for finding in findings {
        if is_allowlisted(finding, allowlist, today) {
            allowlisted.push(finding.clone());
            continue;
        }
        filtered.push(finding.clone());
    }

    for finding in &filtered {
        *by_level.entry(finding.sensitivity.to_string()).or_insert(0) += 1;
        *by_detector.entry(finding.detector.clone()).or_insert(0) += 1;

        match action_for(finding.sensitivity) {
            Action::Deny | Action::Block => blocked.push(finding.clone()),
            Action::Warn => warned.push(finding.clone()),
            Action::Log => logged.push(finding.clone()),
        }
    }

    let summary = Summary {
        total: filtered.len(),
        by_level,
        by_detector,
        scan_duration_ms: scan_duration.as_millis(),
        files_scanned,
    };

    EnforcementReport { allowed: blocked.is_empty(), blocked, warned, logged, allowlisted, summary }
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
