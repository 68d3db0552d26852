//! Tests for RecordStore
//!
//! These tests verify:
//! - Create/open lifecycle and sidecar handling
//! - Insert/get round trips and duplicate rejection
//! - Update and delete via compacting rewrite
//! - Graceful degradation on stale or corrupt state
//! - Field queries

use std::fs;
use std::path::PathBuf;

use rosterdb::{Config, FieldQuery, RecordStore, RosterError, StudentRecord};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_store() -> (TempDir, RecordStore) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("roster.json");
    let store = RecordStore::create(&path, Config::default()).unwrap();
    (temp_dir, store)
}

fn data_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("roster.json")
}

fn sample(id: u64) -> StudentRecord {
    StudentRecord::new(id, format!("Student {}", id), "CS", 2, 4.0)
}

fn line_count(path: &PathBuf) -> usize {
    fs::read_to_string(path).unwrap().lines().count()
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_create_produces_empty_pair() {
    let (temp, store) = setup_store();

    assert!(store.is_empty());
    assert_eq!(fs::read_to_string(data_path(&temp)).unwrap(), "");
    assert_eq!(fs::read_to_string(store.index_path()).unwrap(), "{}");
}

#[test]
fn test_create_truncates_existing_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("roster.json");

    {
        let mut store = RecordStore::create(&path, Config::default()).unwrap();
        store.insert(sample(1)).unwrap();
    }

    let store = RecordStore::create(&path, Config::default()).unwrap();

    assert!(store.is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn test_open_rebuilds_from_data_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("roster.json");

    {
        let mut store = RecordStore::create(&path, Config::default()).unwrap();
        store.insert(sample(1)).unwrap();
        store.insert(sample(2)).unwrap();
    }

    let store = RecordStore::open(&path, Config::default()).unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.get(1).unwrap(), sample(1));
    assert_eq!(store.get(2).unwrap(), sample(2));
}

#[test]
fn test_open_overwrites_corrupt_sidecar() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("roster.json");

    {
        let mut store = RecordStore::create(&path, Config::default()).unwrap();
        store.insert(sample(1)).unwrap();
    }

    // Corrupt the sidecar; open must rebuild an identical index anyway
    let index_path = Config::default().index_path(&path);
    fs::write(&index_path, "garbage, not an index").unwrap();

    let store = RecordStore::open(&path, Config::default()).unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get(1).unwrap(), sample(1));

    // The sidecar was rewritten with the rebuilt mapping
    let sidecar = fs::read_to_string(&index_path).unwrap();
    assert_eq!(sidecar, "{\"1\":0}");
}

#[test]
fn test_open_missing_file_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nope.json");

    let result = RecordStore::open(&path, Config::default());

    assert!(matches!(result.unwrap_err(), RosterError::Io(_)));
}

#[test]
fn test_clear_keeps_file_identity() {
    let (temp, mut store) = setup_store();
    store.insert(sample(1)).unwrap();
    store.insert(sample(2)).unwrap();

    store.clear().unwrap();

    assert!(store.is_empty());
    assert!(data_path(&temp).exists());
    assert_eq!(fs::read_to_string(data_path(&temp)).unwrap(), "");
    assert_eq!(store.get(1), None);
}

// =============================================================================
// Insert / Get Tests
// =============================================================================

#[test]
fn test_insert_then_get_round_trip() {
    let (_temp, mut store) = setup_store();
    let record = StudentRecord::new(1, "Ann", "CS", 2, 4.5);

    store.insert(record.clone()).unwrap();

    assert_eq!(store.get(1), Some(record));
}

#[test]
fn test_insert_duplicate_rejected_before_mutation() {
    let (temp, mut store) = setup_store();
    store.insert(sample(1)).unwrap();

    let before = fs::read_to_string(data_path(&temp)).unwrap();
    let result = store.insert(StudentRecord::new(1, "Other", "EE", 1, 1.0));

    assert!(matches!(result.unwrap_err(), RosterError::DuplicateId { id: 1 }));

    // Prior state intact
    assert_eq!(fs::read_to_string(data_path(&temp)).unwrap(), before);
    assert_eq!(store.get(1).unwrap(), sample(1));
}

#[test]
fn test_insert_appends_in_order() {
    let (temp, mut store) = setup_store();

    for id in 1..=3 {
        store.insert(sample(id)).unwrap();
    }

    assert_eq!(line_count(&data_path(&temp)), 3);
    assert_eq!(store.len(), 3);
}

#[test]
fn test_get_absent_returns_none() {
    let (_temp, mut store) = setup_store();
    store.insert(sample(1)).unwrap();

    assert_eq!(store.get(99), None);
}

#[test]
fn test_get_degrades_on_corrupt_line() {
    let (temp, mut store) = setup_store();
    store.insert(sample(1)).unwrap();

    // Smash the stored line; the indexed offset now points at garbage
    fs::write(data_path(&temp), "@@@ wrecked @@@\n").unwrap();

    assert_eq!(store.get(1), None);
}

#[test]
fn test_unicode_round_trip() {
    let (_temp, mut store) = setup_store();
    let record = StudentRecord::new(7, "Анна Фёдорова", "ВМК", 3, 4.75);

    store.insert(record.clone()).unwrap();
    store.insert(sample(8)).unwrap();

    // Both readable despite multi-byte offsets in between
    assert_eq!(store.get(7), Some(record));
    assert_eq!(store.get(8), Some(sample(8)));
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_update_replaces_payload() {
    let (temp, mut store) = setup_store();
    store.insert(sample(1)).unwrap();
    store.insert(sample(2)).unwrap();

    // Longer payload than the original line
    let updated = StudentRecord::new(1, "Ann with a much longer name", "Mathematics", 4, 4.9);
    store.update(1, updated.clone()).unwrap();

    assert_eq!(store.get(1), Some(updated));
    assert_eq!(store.get(2), Some(sample(2)));
    assert_eq!(line_count(&data_path(&temp)), 2);
}

#[test]
fn test_update_missing_id_fails() {
    let (_temp, mut store) = setup_store();
    store.insert(sample(1)).unwrap();

    let result = store.update(99, sample(99));

    assert!(matches!(result.unwrap_err(), RosterError::NotFound { id: 99 }));
}

#[test]
fn test_update_mismatched_payload_id_fails() {
    let (_temp, mut store) = setup_store();
    store.insert(sample(1)).unwrap();

    let result = store.update(1, sample(2));

    assert!(matches!(result.unwrap_err(), RosterError::Validation(_)));
    assert_eq!(store.get(1).unwrap(), sample(1));
}

#[test]
fn test_update_then_get_after_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("roster.json");
    let updated = StudentRecord::new(1, "Updated", "EE", 3, 3.3);

    {
        let mut store = RecordStore::create(&path, Config::default()).unwrap();
        store.insert(sample(1)).unwrap();
        store.update(1, updated.clone()).unwrap();
    }

    let store = RecordStore::open(&path, Config::default()).unwrap();

    assert_eq!(store.get(1), Some(updated));
}

// =============================================================================
// Remove Tests
// =============================================================================

#[test]
fn test_remove_keeps_survivors() {
    let (temp, mut store) = setup_store();
    for id in 1..=3 {
        store.insert(sample(id)).unwrap();
    }

    store.remove(2).unwrap();

    assert_eq!(store.get(2), None);
    assert_eq!(store.get(1), Some(sample(1)));
    assert_eq!(store.get(3), Some(sample(3)));
    assert_eq!(store.len(), 2);
    assert_eq!(line_count(&data_path(&temp)), 2);
}

#[test]
fn test_remove_missing_id_fails() {
    let (_temp, mut store) = setup_store();
    store.insert(sample(1)).unwrap();

    let result = store.remove(99);

    assert!(matches!(result.unwrap_err(), RosterError::NotFound { id: 99 }));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_remove_only_record_leaves_empty_pair() {
    let (temp, mut store) = setup_store();
    store.insert(sample(1)).unwrap();

    store.remove(1).unwrap();

    assert!(store.is_empty());
    assert_eq!(fs::read_to_string(data_path(&temp)).unwrap(), "");
    assert_eq!(fs::read_to_string(store.index_path()).unwrap(), "{}");
}

#[test]
fn test_compaction_skips_corrupt_survivor() {
    let (temp, mut store) = setup_store();
    store.insert(sample(1)).unwrap();
    store.insert(sample(2)).unwrap();
    store.insert(sample(3)).unwrap();

    // Corrupt record 1's line in place (same byte length, broken JSON)
    let content = fs::read_to_string(data_path(&temp)).unwrap();
    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    lines[0] = "#".repeat(lines[0].len());
    fs::write(data_path(&temp), format!("{}\n", lines.join("\n"))).unwrap();

    // Deleting record 3 compacts; the corrupt entry is dropped, not fatal
    store.remove(3).unwrap();

    assert_eq!(store.get(1), None);
    assert_eq!(store.get(2), Some(sample(2)));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_no_temp_file_left_behind() {
    let (temp, mut store) = setup_store();
    store.insert(sample(1)).unwrap();
    store.insert(sample(2)).unwrap();

    store.remove(1).unwrap();
    store.update(2, sample(2)).unwrap();

    assert!(!Config::default().temp_path(&data_path(&temp)).exists());
}

// =============================================================================
// Find Tests
// =============================================================================

#[test]
fn test_find_by_id_uses_index() {
    let (_temp, mut store) = setup_store();
    store.insert(sample(1)).unwrap();
    store.insert(sample(2)).unwrap();

    let results = store.find(&FieldQuery::Id(2));

    assert_eq!(results, vec![sample(2)]);
    assert!(store.find(&FieldQuery::Id(99)).is_empty());
}

#[test]
fn test_find_by_name_is_case_insensitive() {
    let (_temp, mut store) = setup_store();
    store.insert(StudentRecord::new(1, "Ann", "CS", 2, 4.5)).unwrap();
    store.insert(StudentRecord::new(2, "Bob", "EE", 1, 3.9)).unwrap();

    let results = store.find(&FieldQuery::Name("ANN".to_string()));

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, 1);
}

#[test]
fn test_find_by_group_matches_all() {
    let (_temp, mut store) = setup_store();
    store.insert(StudentRecord::new(1, "Ann", "CS", 2, 4.5)).unwrap();
    store.insert(StudentRecord::new(2, "Bob", "cs", 1, 3.9)).unwrap();
    store.insert(StudentRecord::new(3, "Cleo", "EE", 4, 4.9)).unwrap();

    let results = store.find(&FieldQuery::Group("CS".to_string()));

    assert_eq!(results.len(), 2);
}

#[test]
fn test_find_by_level_and_score() {
    let (_temp, mut store) = setup_store();
    store.insert(StudentRecord::new(1, "Ann", "CS", 2, 4.5)).unwrap();
    store.insert(StudentRecord::new(2, "Bob", "EE", 2, 3.9)).unwrap();

    assert_eq!(store.find(&FieldQuery::Level(2)).len(), 2);
    assert_eq!(store.find(&FieldQuery::Score(3.9)).len(), 1);
    assert!(store.find(&FieldQuery::Score(5.0)).is_empty());
}

#[test]
fn test_all_returns_every_record() {
    let (_temp, mut store) = setup_store();
    for id in 1..=5 {
        store.insert(sample(id)).unwrap();
    }

    let records = store.all();

    assert_eq!(records.len(), 5);
    for record in &records {
        assert_eq!(*record, sample(record.id));
    }
}
