//! WAL Record definitions
//!
//! Defines the on-disk layout of a single log record and its codec.
//!
//! ```text
//! ┌───────────────┬────────────────┬──────────────────┬─────────┬───────────┐
//! │ Timestamp (4) │ Key Len (4)    │ Value Len (4)    │ Key     │ Value     │
//! └───────────────┴────────────────┴──────────────────┴─────────┴───────────┘
//! ```
//!
//! All integers are little-endian `u32`. A value length of 0 marks a
//! tombstone, so live values are never empty.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{LedgerError, Result};

/// Header size: timestamp (4) + key_len (4) + value_len (4)
pub const HEADER_SIZE: usize = 12;

/// Largest key or value a header length field can describe
pub const MAX_FIELD_LEN: usize = u32::MAX as usize;

/// Header length field for a key or value of `len` bytes
///
/// Fails with `InvalidInput` if `len` does not fit in 32 bits.
pub fn length_field(field: &str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        LedgerError::invalid_input(format!(
            "{} of {} bytes exceeds the {} byte limit",
            field, len, MAX_FIELD_LEN
        ))
    })
}

/// Fixed-size header in front of every record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Seconds since the epoch, wrapping at 2^32. Recorded, never interpreted.
    pub timestamp: u32,
    pub key_len: u32,
    pub value_len: u32,
}

impl RecordHeader {
    /// Decode a header from the start of `bytes`
    ///
    /// Fails with `TruncatedHeader` if fewer than [`HEADER_SIZE`] bytes
    /// are available. `offset` only labels the error.
    pub fn decode(bytes: &[u8], offset: u64) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(LedgerError::TruncatedHeader {
                offset,
                available: bytes.len(),
            });
        }

        let mut buf = &bytes[..HEADER_SIZE];
        Ok(Self {
            timestamp: buf.get_u32_le(),
            key_len: buf.get_u32_le(),
            value_len: buf.get_u32_le(),
        })
    }

    /// True if this header describes a delete marker
    pub fn is_tombstone(&self) -> bool {
        self.value_len == 0
    }

    /// Bytes following the header (key + value)
    pub fn body_len(&self) -> u64 {
        self.key_len as u64 + self.value_len as u64
    }

    /// Total on-disk size of the record this header starts
    pub fn record_len(&self) -> u64 {
        HEADER_SIZE as u64 + self.body_len()
    }
}

/// A single record of the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub timestamp: u32,
    pub key: String,
    /// `None` for a tombstone
    pub value: Option<Vec<u8>>,
}

impl Record {
    /// A value record stamped with the current time
    pub fn put(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            timestamp: current_timestamp(),
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// A tombstone record stamped with the current time
    pub fn tombstone(key: impl Into<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            key: key.into(),
            value: None,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.value.is_none()
    }

    /// Check that key and value lengths fit their header fields
    ///
    /// [`Record::header`] and [`Record::encode`] assume this holds.
    pub fn check_lengths(&self) -> Result<()> {
        length_field("key", self.key.len())?;
        if let Some(value) = &self.value {
            length_field("value", value.len())?;
        }
        Ok(())
    }

    /// Header describing this record
    pub fn header(&self) -> RecordHeader {
        RecordHeader {
            timestamp: self.timestamp,
            key_len: self.key.len() as u32,
            value_len: self.value.as_ref().map_or(0, |v| v.len() as u32),
        }
    }

    /// Total encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        self.header().record_len() as usize
    }

    /// Encode to the on-disk layout
    ///
    /// Format: timestamp (4) + key_len (4) + value_len (4) + key + value
    pub fn encode(&self) -> Bytes {
        let header = self.header();
        let mut buf = BytesMut::with_capacity(self.encoded_len());

        buf.put_u32_le(header.timestamp);
        buf.put_u32_le(header.key_len);
        buf.put_u32_le(header.value_len);
        buf.put_slice(self.key.as_bytes());
        if let Some(value) = &self.value {
            buf.put_slice(value);
        }

        buf.freeze()
    }

    /// Decode one record from the start of `bytes`
    ///
    /// Trailing bytes beyond the record are ignored. `offset` is where
    /// `bytes` starts in the log and is used only to label errors.
    pub fn decode(bytes: &[u8], offset: u64) -> Result<Self> {
        let header = RecordHeader::decode(bytes, offset)?;
        let body = &bytes[HEADER_SIZE..];

        let key_len = header.key_len as usize;
        if body.len() < key_len {
            return Err(LedgerError::CorruptedKey { offset });
        }
        let (key_bytes, rest) = body.split_at(key_len);

        let value_len = header.value_len as usize;
        if rest.len() < value_len {
            return Err(LedgerError::CorruptedValue { offset });
        }

        Self::from_parts(header, key_bytes.to_vec(), rest[..value_len].to_vec(), offset)
    }

    /// Assemble a record from a decoded header and its raw body
    pub(crate) fn from_parts(
        header: RecordHeader,
        key_bytes: Vec<u8>,
        value_bytes: Vec<u8>,
        offset: u64,
    ) -> Result<Self> {
        let key = String::from_utf8(key_bytes)
            .map_err(|_| LedgerError::InvalidKeyEncoding { offset })?;

        let value = if header.is_tombstone() {
            None
        } else {
            Some(value_bytes)
        };

        Ok(Self {
            timestamp: header.timestamp,
            key,
            value,
        })
    }
}

/// Seconds since the epoch, truncated to 32 bits
pub fn current_timestamp() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}
