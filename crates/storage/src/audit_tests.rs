use super::*;

fn now() -> DateTime<Utc> {
    "2026-06-15T12:00:00Z".parse().unwrap()
}

fn config(dir: &Path) -> AuditLogConfig {
    AuditLogConfig {
        destination: AuditDestination::File,
        path: dir.join("audit.jsonl"),
        include_content: true,
        max_bytes: DEFAULT_MAX_BYTES,
        retention_days: DEFAULT_RETENTION_DAYS,
    }
}

#[test]
fn record_appends_one_json_line_per_call() {
    let dir = tempfile::tempdir().unwrap();
    let log = AuditLog::new(config(dir.path())).unwrap();
    log.record(now(), "gate.blocked", serde_json::json!({"workOrderId": "wko-1"}), None).unwrap();
    log.record(now(), "gate.blocked", serde_json::json!({"workOrderId": "wko-2"}), None).unwrap();

    let body = std::fs::read_to_string(dir.path().join("audit.jsonl")).unwrap();
    assert_eq!(body.lines().count(), 2);
    for line in body.lines() {
        serde_json::from_str::<serde_json::Value>(line).unwrap();
    }
}

#[test]
fn content_is_omitted_when_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.include_content = false;
    let log = AuditLog::new(cfg).unwrap();
    log.record(now(), "finding.logged", serde_json::json!({}), Some(serde_json::json!({"secret": "x"}))).unwrap();

    let body = std::fs::read_to_string(dir.path().join("audit.jsonl")).unwrap();
    assert!(!body.contains("secret"));
}

#[test]
fn content_is_kept_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let log = AuditLog::new(config(dir.path())).unwrap();
    log.record(now(), "finding.logged", serde_json::json!({}), Some(serde_json::json!({"secret": "x"}))).unwrap();

    let body = std::fs::read_to_string(dir.path().join("audit.jsonl")).unwrap();
    assert!(body.contains("secret"));
}

#[test]
fn rotation_moves_the_oversized_file_aside() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.max_bytes = 10;
    let log = AuditLog::new(cfg).unwrap();

    log.record(now(), "first", serde_json::json!({}), None).unwrap();
    log.record(now(), "second", serde_json::json!({}), None).unwrap();

    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(names.len(), 2);
    assert_eq!(names[0], "audit.jsonl");
    assert!(names[1].starts_with("audit.jsonl-"));
}

#[test]
fn sweep_retention_removes_only_rotated_files_older_than_the_window() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let old_ts = (now() - chrono::Duration::days(120)).timestamp();
    let recent_ts = (now() - chrono::Duration::days(1)).timestamp();
    std::fs::write(dir.path().join(format!("audit.jsonl-{old_ts}")), "{}\n").unwrap();
    std::fs::write(dir.path().join(format!("audit.jsonl-{recent_ts}")), "{}\n").unwrap();
    std::fs::write(dir.path().join("audit.jsonl"), "{}\n").unwrap();

    let log = AuditLog::new(cfg).unwrap();
    let removed = log.sweep_retention(now()).unwrap();

    assert_eq!(removed, 1);
    assert!(!dir.path().join(format!("audit.jsonl-{old_ts}")).exists());
    assert!(dir.path().join(format!("audit.jsonl-{recent_ts}")).exists());
    assert!(dir.path().join("audit.jsonl").exists());
}
