//! Tests for WAL Reader
//!
//! These tests verify:
//! - Positioned reads at record offsets
//! - Raw reads do not depend on record boundaries
//! - Sequential scan yields offsets in log order
//! - Scan stops with one error at the first damaged record
//! - Shared locks coexist; exclusive and shared locks exclude each other

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use ledgerkv::config::SyncStrategy;
use ledgerkv::wal::{FileLockGuard, LockMode, Record, WalReader, WalWriter, HEADER_SIZE};
use ledgerkv::LedgerError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");
    (temp_dir, wal_path)
}

fn write_records(path: &PathBuf, records: &[Record]) -> Vec<u64> {
    let mut writer = WalWriter::open(path, SyncStrategy::EveryWrite).unwrap();
    records.iter().map(|r| writer.append(r).unwrap()).collect()
}

// =============================================================================
// Positioned Read Tests
// =============================================================================

#[test]
fn test_read_record_at_offsets() {
    let (_temp, wal_path) = setup_temp_wal();
    let offsets = write_records(
        &wal_path,
        &[Record::put("a", "1"), Record::put("b", "2"), Record::tombstone("a")],
    );

    let reader = WalReader::open(&wal_path).unwrap();

    let b = reader.read_record_at(offsets[1]).unwrap();
    assert_eq!(b.key, "b");
    assert_eq!(b.value, Some(b"2".to_vec()));

    let a = reader.read_record_at(offsets[0]).unwrap();
    assert_eq!(a.value, Some(b"1".to_vec()));

    let tombstone = reader.read_record_at(offsets[2]).unwrap();
    assert!(tombstone.is_tombstone());
}

#[test]
fn test_read_record_at_end_of_file() {
    let (_temp, wal_path) = setup_temp_wal();
    write_records(&wal_path, &[Record::put("a", "1")]);

    let reader = WalReader::open(&wal_path).unwrap();
    let err = reader.read_record_at(1_000).unwrap_err();

    assert!(matches!(err, LedgerError::TruncatedHeader { available: 0, .. }));
}

#[test]
fn test_read_at_raw_bytes() {
    let (_temp, wal_path) = setup_temp_wal();
    write_records(&wal_path, &[Record::put("key", "value")]);

    let reader = WalReader::open(&wal_path).unwrap();
    let key = reader.read_at(HEADER_SIZE as u64, 3).unwrap();

    assert_eq!(key, b"key");
}

#[test]
fn test_open_missing_file_fails() {
    let (_temp, wal_path) = setup_temp_wal();
    assert!(matches!(WalReader::open(&wal_path), Err(LedgerError::Io(_))));
}

// =============================================================================
// Scan Tests
// =============================================================================

#[test]
fn test_scan_empty_file() {
    let (_temp, wal_path) = setup_temp_wal();
    File::create(&wal_path).unwrap();

    let reader = WalReader::open(&wal_path).unwrap();
    assert_eq!(reader.scan().unwrap().count(), 0);
}

#[test]
fn test_scan_yields_offsets_in_order() {
    let (_temp, wal_path) = setup_temp_wal();
    let records = vec![
        Record::put("k1", "v1"),
        Record::put("k2", "v2"),
        Record::tombstone("k1"),
        Record::put("k1", "v3"),
    ];
    let offsets = write_records(&wal_path, &records);

    let reader = WalReader::open(&wal_path).unwrap();
    let scanned: Vec<(u64, Record)> = reader.scan().unwrap().map(|r| r.unwrap()).collect();

    assert_eq!(scanned.len(), 4);
    for ((offset, record), (expected_offset, expected)) in
        scanned.iter().zip(offsets.iter().zip(records.iter()))
    {
        assert_eq!(offset, expected_offset);
        assert_eq!(record, expected);
    }
}

#[test]
fn test_scan_stops_after_first_error() {
    let (_temp, wal_path) = setup_temp_wal();
    let good = Record::put("good", "value");
    write_records(&wal_path, &[good.clone()]);

    {
        let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
        file.write_all(&[1, 2, 3, 4, 5]).unwrap();
    }

    let reader = WalReader::open(&wal_path).unwrap();
    let mut scanner = reader.scan().unwrap();

    let (offset, record) = scanner.next().unwrap().unwrap();
    assert_eq!(offset, 0);
    assert_eq!(record, good);

    match scanner.next() {
        Some(Err(LedgerError::TruncatedHeader { offset, available })) => {
            assert_eq!(offset, good.encoded_len() as u64);
            assert_eq!(available, 5);
        }
        other => panic!("expected truncated header, got {:?}", other),
    }

    assert!(scanner.next().is_none());
    assert_eq!(scanner.offset(), good.encoded_len() as u64);
}

// =============================================================================
// Locking Tests
// =============================================================================

#[test]
fn test_shared_locks_coexist() {
    let (_temp, wal_path) = setup_temp_wal();
    write_records(&wal_path, &[Record::put("k", "v")]);

    let holder = File::open(&wal_path).unwrap();
    let guard = FileLockGuard::acquire(&holder, LockMode::Shared).unwrap();
    assert_eq!(guard.mode(), LockMode::Shared);

    // A second shared locker (another handle) is not blocked
    let reader = WalReader::open(&wal_path).unwrap();
    assert_eq!(reader.read_record_at(0).unwrap().key, "k");
}

#[test]
fn test_exclusive_lock_released_on_drop() {
    let (_temp, wal_path) = setup_temp_wal();
    write_records(&wal_path, &[Record::put("k", "v")]);

    let holder = OpenOptions::new().read(true).write(true).open(&wal_path).unwrap();
    {
        let _guard = FileLockGuard::acquire(&holder, LockMode::Exclusive).unwrap();
    }

    // Would block forever if the exclusive lock were still held
    let reader = WalReader::open(&wal_path).unwrap();
    assert_eq!(reader.read_record_at(0).unwrap().key, "k");
}

#[test]
fn test_read_waits_for_exclusive_lock() {
    let (_temp, wal_path) = setup_temp_wal();
    write_records(&wal_path, &[Record::put("k", "v")]);

    let holder = OpenOptions::new().read(true).write(true).open(&wal_path).unwrap();
    let guard = FileLockGuard::acquire(&holder, LockMode::Exclusive).unwrap();

    let (tx, rx) = mpsc::channel();
    let path = wal_path.clone();
    let reader = thread::spawn(move || {
        let record = WalReader::open(&path).unwrap().read_record_at(0).unwrap();
        tx.send(record.key).unwrap();
    });

    assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());

    drop(guard);
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "k");
    reader.join().unwrap();
}

#[test]
fn test_append_waits_for_shared_lock() {
    let (_temp, wal_path) = setup_temp_wal();
    write_records(&wal_path, &[Record::put("a", "1")]);

    let holder = File::open(&wal_path).unwrap();
    let guard = FileLockGuard::acquire(&holder, LockMode::Shared).unwrap();

    let (tx, rx) = mpsc::channel();
    let path = wal_path.clone();
    let writer = thread::spawn(move || {
        let mut writer = WalWriter::open(&path, SyncStrategy::EveryWrite).unwrap();
        tx.send(writer.append(&Record::put("b", "2")).unwrap()).unwrap();
    });

    assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());

    drop(guard);
    let offset = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(offset, Record::put("a", "1").encoded_len() as u64);
    writer.join().unwrap();
}
