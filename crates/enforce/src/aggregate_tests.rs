use super::*;
use agentgate_core::Sensitivity;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn finding(file: &str, sensitivity: Sensitivity, detector: &str) -> Finding {
    Finding::new("rule-1", "message", file, sensitivity, detector)
}

#[test]
fn buckets_partition_every_non_allowlisted_finding() {
    let findings = vec![
        finding("a.rs", Sensitivity::Info, "det-a"),
        finding("b.rs", Sensitivity::Warning, "det-a"),
        finding("c.rs", Sensitivity::Sensitive, "det-b"),
        finding("d.rs", Sensitivity::Restricted, "det-b"),
    ];
    let report = aggregate(&findings, &[], date(2026, 1, 1), Duration::from_millis(10), 4);
    assert_eq!(report.logged.len(), 1);
    assert_eq!(report.warned.len(), 1);
    assert_eq!(report.blocked.len(), 2);
    assert_eq!(report.blocked.len() + report.warned.len() + report.logged.len(), report.summary.total);
    assert!(!report.allowed);
}

#[test]
fn restricted_findings_outside_allowlist_are_blocked() {
    let findings = vec![finding("src/secret.rs", Sensitivity::Restricted, "secrets")];
    let report = aggregate(&findings, &[], date(2026, 1, 1), Duration::from_millis(1), 1);
    assert_eq!(report.blocked.len(), 1);
    assert!(!report.allowed);
}

#[test]
fn allowlisted_findings_on_test_glob_are_excluded_from_blocked() {
    let findings = vec![finding("test/fixture.rs", Sensitivity::Restricted, "secrets")];
    let allowlist =
        vec![AllowlistEntry { path_glob: "test/**".to_string(), reason: "fixtures".to_string(), detectors: vec![], expires: None }];
    let report = aggregate(&findings, &allowlist, date(2026, 1, 1), Duration::from_millis(1), 1);
    assert!(report.blocked.is_empty());
    assert_eq!(report.allowlisted.len(), 1);
    assert!(report.allowed);
}

#[test]
fn expired_allowlist_entry_does_not_suppress_the_finding() {
    let findings = vec![finding("test/fixture.rs", Sensitivity::Restricted, "secrets")];
    let allowlist = vec![AllowlistEntry {
        path_glob: "test/**".to_string(),
        reason: "fixtures".to_string(),
        detectors: vec![],
        expires: Some(date(2025, 1, 1)),
    }];
    let report = aggregate(&findings, &allowlist, date(2026, 1, 1), Duration::from_millis(1), 1);
    assert_eq!(report.blocked.len(), 1);
}

#[test]
fn allowlist_entry_scoped_to_a_detector_does_not_cover_other_detectors() {
    let findings = vec![finding("test/fixture.rs", Sensitivity::Restricted, "secrets")];
    let allowlist = vec![AllowlistEntry {
        path_glob: "test/**".to_string(),
        reason: "fixtures".to_string(),
        detectors: vec!["other-detector".to_string()],
        expires: None,
    }];
    let report = aggregate(&findings, &allowlist, date(2026, 1, 1), Duration::from_millis(1), 1);
    assert_eq!(report.blocked.len(), 1);
}

#[test]
fn by_level_and_by_detector_counts_match_filtered_findings() {
    let findings = vec![
        finding("a.rs", Sensitivity::Warning, "lint"),
        finding("b.rs", Sensitivity::Warning, "lint"),
        finding("c.rs", Sensitivity::Sensitive, "secrets"),
    ];
    let report = aggregate(&findings, &[], date(2026, 1, 1), Duration::from_millis(1), 3);
    assert_eq!(report.summary.by_level.get("warning"), Some(&2));
    assert_eq!(report.summary.by_level.get("sensitive"), Some(&1));
    assert_eq!(report.summary.by_detector.get("lint"), Some(&2));
    assert_eq!(report.summary.by_detector.get("secrets"), Some(&1));
}
