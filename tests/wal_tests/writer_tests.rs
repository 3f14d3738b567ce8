//! Tests for WAL Writer
//!
//! These tests verify:
//! - Appends return the offset of the record header
//! - Offsets follow records appended through other handles
//! - Reopening appends after existing content
//! - Sync strategies

use std::fs;
use std::path::PathBuf;

use ledgerkv::config::SyncStrategy;
use ledgerkv::wal::{Record, WalReader, WalWriter, HEADER_SIZE};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");
    (temp_dir, wal_path)
}

// =============================================================================
// Basic Writing Tests
// =============================================================================

#[test]
fn test_open_creates_file() {
    let (_temp, wal_path) = setup_temp_wal();

    let writer = WalWriter::open(&wal_path, SyncStrategy::EveryWrite).unwrap();

    assert!(wal_path.exists());
    assert_eq!(writer.current_append_offset().unwrap(), 0);
    assert_eq!(writer.path(), wal_path.as_path());
}

#[test]
fn test_open_creates_parent_directories() {
    let temp = TempDir::new().unwrap();
    let wal_path = temp.path().join("a").join("b").join("test.wal");

    WalWriter::open(&wal_path, SyncStrategy::EveryWrite).unwrap();

    assert!(wal_path.exists());
}

#[test]
fn test_append_returns_record_offsets() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, SyncStrategy::EveryWrite).unwrap();

    let first = Record::put("a", "1");
    let second = Record::tombstone("a");
    let third = Record::put("bb", "22");

    let off1 = writer.append(&first).unwrap();
    let off2 = writer.append(&second).unwrap();
    let off3 = writer.append(&third).unwrap();

    assert_eq!(off1, 0);
    assert_eq!(off2, first.encoded_len() as u64);
    assert_eq!(off3, off2 + second.encoded_len() as u64);
    assert_eq!(writer.records_appended(), 3);
    assert_eq!(
        writer.current_append_offset().unwrap(),
        off3 + third.encoded_len() as u64
    );
}

#[test]
fn test_appended_bytes_match_encoding() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, SyncStrategy::EveryWrite).unwrap();

    let record = Record::put("key", "value");
    writer.append(&record).unwrap();

    let on_disk = fs::read(&wal_path).unwrap();
    assert_eq!(on_disk, record.encode().to_vec());
}

#[test]
fn test_reopen_appends_after_existing_records() {
    let (_temp, wal_path) = setup_temp_wal();

    let first = Record::put("k1", "v1");
    {
        let mut writer = WalWriter::open(&wal_path, SyncStrategy::EveryWrite).unwrap();
        writer.append(&first).unwrap();
    }

    let mut writer = WalWriter::open(&wal_path, SyncStrategy::EveryWrite).unwrap();
    let offset = writer.append(&Record::put("k2", "v2")).unwrap();

    assert_eq!(offset, first.encoded_len() as u64);
}

#[test]
fn test_offset_accounts_for_other_handles() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer_a = WalWriter::open(&wal_path, SyncStrategy::EveryWrite).unwrap();
    let mut writer_b = WalWriter::open(&wal_path, SyncStrategy::EveryWrite).unwrap();

    let record_a = Record::put("from-a", "1");
    let record_b = Record::put("from-b", "2");

    let off_a = writer_a.append(&record_a).unwrap();
    let off_b = writer_b.append(&record_b).unwrap();

    assert_eq!(off_a, 0);
    assert_eq!(off_b, record_a.encoded_len() as u64);

    let reader = WalReader::open(&wal_path).unwrap();
    assert_eq!(reader.read_record_at(off_a).unwrap().key, "from-a");
    assert_eq!(reader.read_record_at(off_b).unwrap().key, "from-b");
}

// =============================================================================
// Sync Strategy Tests
// =============================================================================

#[test]
fn test_os_buffered_strategy_still_visible_to_readers() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, SyncStrategy::OsBuffered).unwrap();

    let offset = writer.append(&Record::put("k", "v")).unwrap();

    let reader = WalReader::open(&wal_path).unwrap();
    let record = reader.read_record_at(offset).unwrap();
    assert_eq!(record.value, Some(b"v".to_vec()));
}

#[test]
fn test_explicit_sync() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, SyncStrategy::OsBuffered).unwrap();

    writer.append(&Record::put("k", "v")).unwrap();
    writer.sync().unwrap();

    assert_eq!(fs::metadata(&wal_path).unwrap().len(), (HEADER_SIZE + 2) as u64);
}
