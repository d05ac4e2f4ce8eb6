//! Tests for stats and explicit compaction
//!
//! These tests verify:
//! - Space accounting for active, deleted and garbage bytes
//! - Compaction drops dead slots and garbage only
//! - Identifiers, header and list order survive compaction
//! - A failed compaction leaves the original file untouched

mod common;

use std::fs::{self, OpenOptions};
use std::io::Write;

use common::{reopen, setup_temp_store, slot_size, Item};
use slotfile::storage::HEADER_SIZE;
use slotfile::SlotError;
use tempfile::TempDir;

fn fragmented_store() -> (TempDir, slotfile::RecordStore<Item>) {
    let (temp, mut store) = setup_temp_store();
    for name in ["aaaa", "bbbb", "cccc"] {
        store.insert(&mut Item::new(name)).unwrap();
    }
    store.delete(2).unwrap();
    store.update(&Item::with_id(1, "a")).unwrap();
    store.update(&Item::with_id(3, "cccccccccc")).unwrap();
    (temp, store)
}

// =============================================================================
// Stats Tests
// =============================================================================

#[test]
fn test_stats_empty_store() {
    let (_temp, mut store) = setup_temp_store();

    let stats = store.stats().unwrap();

    assert_eq!(stats.active, 0);
    assert_eq!(stats.deleted, 0);
    assert_eq!(stats.file_len, HEADER_SIZE);
    assert_eq!(stats.reclaimable_bytes(), 0);
}

#[test]
fn test_stats_after_fragmentation() {
    let (_temp, mut store) = fragmented_store();

    let stats = store.stats().unwrap();

    assert_eq!(stats.active, 2);
    assert_eq!(stats.deleted, 2);
    assert_eq!(stats.payload_bytes, 5 + 14);
    assert_eq!(stats.garbage_bytes, 3);
    assert_eq!(stats.dead_bytes, 2 * slot_size("bbbb"));
}

#[test]
fn test_stats_relocated_slot_garbage_counted_once() {
    let (_temp, mut store) = setup_temp_store();
    store.insert(&mut Item::new("aaaa")).unwrap();
    store.update(&Item::with_id(1, "a")).unwrap();
    store.update(&Item::with_id(1, "much longer name")).unwrap();

    let stats = store.stats().unwrap();

    assert_eq!(stats.deleted, 1);
    assert_eq!(stats.garbage_bytes, 0);
    assert_eq!(stats.dead_bytes, slot_size("aaaa"));
    assert_eq!(store.compact().unwrap(), stats.reclaimable_bytes());
}

#[test]
fn test_stats_deleted_shrunk_slot() {
    let (_temp, mut store) = setup_temp_store();
    store.insert(&mut Item::new("long name")).unwrap();
    store.insert(&mut Item::new("kept")).unwrap();
    store.update(&Item::with_id(1, "x")).unwrap();
    store.delete(1).unwrap();

    let stats = store.stats().unwrap();

    assert_eq!(stats.garbage_bytes, 0);
    assert_eq!(stats.dead_bytes, slot_size("long name"));
    assert_eq!(store.compact().unwrap(), stats.reclaimable_bytes());
}

// =============================================================================
// Compaction Tests
// =============================================================================

#[test]
fn test_compact_reclaims_dead_space() {
    let (_temp, mut store) = fragmented_store();
    let before = store.stats().unwrap();

    let reclaimed = store.compact().unwrap();

    assert_eq!(reclaimed, before.reclaimable_bytes());
    let after = store.stats().unwrap();
    assert_eq!(after.deleted, 0);
    assert_eq!(after.garbage_bytes, 0);
    assert_eq!(after.file_len, HEADER_SIZE + slot_size("a") + slot_size("cccccccccc"));
}

#[test]
fn test_compact_preserves_records_and_header() {
    let (_temp, mut store) = fragmented_store();
    let listed = store.list().unwrap();

    store.compact().unwrap();

    assert_eq!(store.list().unwrap(), listed);
    assert_eq!(store.last_assigned_id().unwrap(), 3);
    assert_eq!(store.locate(1).unwrap(), Some(HEADER_SIZE));
    assert_eq!(store.insert(&mut Item::new("d")).unwrap(), 4);
}

#[test]
fn test_compact_survives_reopen() {
    let (temp_dir, mut store) = fragmented_store();
    store.compact().unwrap();
    store.close().unwrap();

    let mut store = reopen(&temp_dir);

    assert_eq!(
        store.list().unwrap(),
        vec![Item::with_id(1, "a"), Item::with_id(3, "cccccccccc")]
    );
    assert!(!temp_dir.path().join("items.db.compact").exists());
}

#[test]
fn test_compact_empty_store() {
    let (_temp, mut store) = setup_temp_store();

    assert_eq!(store.compact().unwrap(), 0);
    assert_eq!(store.file_len().unwrap(), HEADER_SIZE);
}

#[test]
fn test_compact_corrupt_file_is_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("items.db");

    {
        let mut store = reopen(&temp_dir);
        store.insert(&mut Item::new("a")).unwrap();
    }
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&[0x20, 0x7F, 0, 0, 0]).unwrap();
    drop(file);
    let before = fs::read(&path).unwrap();

    let mut store = reopen(&temp_dir);
    assert!(matches!(store.compact(), Err(SlotError::Corruption { .. })));

    assert_eq!(fs::read(&path).unwrap(), before);
    assert!(!temp_dir.path().join("items.db.compact").exists());
}

#[cfg(unix)]
#[test]
fn test_compact_failed_rename_keeps_store_usable() {
    let (temp_dir, mut store) = fragmented_store();
    let path = temp_dir.path().join("items.db");

    // A directory at the data path makes the final rename fail
    fs::remove_file(&path).unwrap();
    fs::create_dir(&path).unwrap();

    assert!(matches!(store.compact(), Err(SlotError::Io(_))));
    assert!(!temp_dir.path().join("items.db.compact").exists());

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(store.insert(&mut Item::new("d")).unwrap(), 4);
    assert_eq!(store.find(4).unwrap(), Some(Item::with_id(4, "d")));
}
