//! WAL Reader
//!
//! Handles reading records from the WAL file through a dedicated read
//! handle, independent of the writer's append cursor.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{LedgerError, Result};
use super::lock::{FileLockGuard, LockMode};
use super::{Record, RecordHeader, HEADER_SIZE};

/// Reads records from the WAL file
#[derive(Debug)]
pub struct WalReader {
    file: File,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self { file })
    }

    /// Read the record whose header starts at `offset`
    ///
    /// Holds a shared lock for the duration of the read.
    pub fn read_record_at(&self, offset: u64) -> Result<Record> {
        let _guard = FileLockGuard::acquire(&self.file, LockMode::Shared)?;

        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset))?;
        read_record(&mut file, offset)?.ok_or(LedgerError::TruncatedHeader {
            offset,
            available: 0,
        })
    }

    /// Read `len` raw bytes starting at `offset`
    ///
    /// Holds a shared lock for the duration of the read.
    pub fn read_at(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let _guard = FileLockGuard::acquire(&self.file, LockMode::Shared)?;

        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Lock the file shared and iterate over every record from offset 0
    ///
    /// The lock is held until the returned scanner is dropped.
    pub fn scan(&self) -> Result<WalScanner<'_>> {
        let guard = FileLockGuard::acquire(&self.file, LockMode::Shared)?;

        let mut file = &self.file;
        file.seek(SeekFrom::Start(0))?;

        Ok(WalScanner {
            _guard: guard,
            reader: BufReader::new(file),
            offset: 0,
            failed: false,
        })
    }
}

/// Sequential scan over the log under a shared lock
///
/// Yields `(offset, record)` pairs in log order. Stops at a clean end of
/// file; yields one error and then stops at the first damaged record.
pub struct WalScanner<'a> {
    _guard: FileLockGuard<'a>,
    reader: BufReader<&'a File>,
    offset: u64,
    failed: bool,
}

impl WalScanner<'_> {
    /// Offset of the next record to be read (bytes consumed so far)
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl Iterator for WalScanner<'_> {
    type Item = Result<(u64, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let offset = self.offset;
        match read_record(&mut self.reader, offset) {
            Ok(Some(record)) => {
                self.offset += record.encoded_len() as u64;
                Some(Ok((offset, record)))
            }
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Read one record from the current position of `reader`
///
/// Returns `Ok(None)` when the reader is exactly at end of file.
fn read_record<R: Read>(reader: &mut R, offset: u64) -> Result<Option<Record>> {
    let mut header_buf = [0u8; HEADER_SIZE];
    let read = read_full(reader, &mut header_buf)?;
    if read == 0 {
        return Ok(None);
    }

    let header = RecordHeader::decode(&header_buf[..read], offset)?;

    let key_bytes = read_up_to(reader, header.key_len)?;
    if key_bytes.len() < header.key_len as usize {
        return Err(LedgerError::CorruptedKey { offset });
    }

    let value_bytes = read_up_to(reader, header.value_len)?;
    if value_bytes.len() < header.value_len as usize {
        return Err(LedgerError::CorruptedValue { offset });
    }

    Record::from_parts(header, key_bytes, value_bytes, offset).map(Some)
}

/// Read at most `len` bytes, growing the buffer as data arrives
///
/// `len` comes from an on-disk header and is not preallocated.
fn read_up_to<R: Read>(reader: &mut R, len: u32) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Fill `buf` as far as the reader allows, returning the bytes read
///
/// Unlike `read_exact`, a short read at end of file is not an error.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
