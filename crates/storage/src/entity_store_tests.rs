use super::*;
use agentgate_core::test_support::sample_work_order;
use agentgate_core::WorkOrder;
use serde::Deserialize;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Widget {
    name: String,
    count: u32,
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store: EntityStore<Widget> = EntityStore::open(dir.path()).unwrap();
    let widget = Widget { name: "bolt".into(), count: 7 };

    store.save("w1", &widget).unwrap();
    assert_eq!(store.load("w1").unwrap(), widget);
}

#[test]
fn load_of_missing_id_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store: EntityStore<Widget> = EntityStore::open(dir.path()).unwrap();
    let err = store.load("ghost").unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}

#[test]
fn save_overwrites_a_prior_value_for_the_same_id() {
    let dir = tempfile::tempdir().unwrap();
    let store: EntityStore<Widget> = EntityStore::open(dir.path()).unwrap();
    store.save("w1", &Widget { name: "a".into(), count: 1 }).unwrap();
    store.save("w1", &Widget { name: "b".into(), count: 2 }).unwrap();
    assert_eq!(store.load("w1").unwrap(), Widget { name: "b".into(), count: 2 });
}

#[test]
fn delete_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store: EntityStore<Widget> = EntityStore::open(dir.path()).unwrap();
    store.save("w1", &Widget { name: "a".into(), count: 1 }).unwrap();
    store.delete("w1").unwrap();
    store.delete("w1").unwrap();
    assert!(!store.exists("w1"));
}

#[test]
fn list_ids_reports_only_persisted_entities() {
    let dir = tempfile::tempdir().unwrap();
    let store: EntityStore<Widget> = EntityStore::open(dir.path()).unwrap();
    store.save("w1", &Widget { name: "a".into(), count: 1 }).unwrap();
    store.save("w2", &Widget { name: "b".into(), count: 2 }).unwrap();

    let mut ids = store.list_ids().unwrap();
    ids.sort();
    assert_eq!(ids, vec!["w1".to_string(), "w2".to_string()]);
}

#[test]
fn no_temp_file_is_left_behind_after_a_save() {
    let dir = tempfile::tempdir().unwrap();
    let store: EntityStore<Widget> = EntityStore::open(dir.path()).unwrap();
    store.save("w1", &Widget { name: "a".into(), count: 1 }).unwrap();
    assert!(!dir.path().join("w1.json.tmp").exists());
    assert!(dir.path().join("w1.json").exists());
}

#[test]
fn a_real_work_order_round_trips_with_iso8601_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let store: EntityStore<WorkOrder> = EntityStore::open(dir.path()).unwrap();
    let work_order = sample_work_order();

    store.save(work_order.id.as_str(), &work_order).unwrap();
    let loaded = store.load(work_order.id.as_str()).unwrap();
    assert_eq!(loaded.created_at, work_order.created_at);
    assert_eq!(loaded.task_prompt, work_order.task_prompt);

    let raw = std::fs::read_to_string(dir.path().join(format!("{}.json", work_order.id.as_str()))).unwrap();
    assert!(raw.contains("2026-01-01T00:00:00"));
}

#[cfg(unix)]
#[test]
fn the_store_directory_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let _store: EntityStore<Widget> = EntityStore::open(dir.path()).unwrap();
    let mode = std::fs::metadata(dir.path()).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o700);
}
