//! # Record - CrestKV record codec
//!
//! Every mutation that touches disk, whether in the write-ahead log or in a
//! segment file, is framed the same way:
//!
//! ```text
//! [len: i64 BE][payload: len bytes of JSON]
//! ```
//!
//! The payload is a self-describing JSON document:
//!
//! ```text
//! {"Operation":"set","Key":"name","Value":"Alice"}
//! {"Operation":"del","Key":"name","Value":""}
//! ```
//!
//! Field names and operation strings are fixed; they are part of the on-disk
//! format and must not change without a version bump. Unknown fields are
//! ignored on decode so newer writers can add fields without breaking older
//! readers.
//!
//! ## Example
//!
//! ```rust
//! use record::{Op, Record};
//! use std::io::Cursor;
//!
//! let rec = Record::set("k", "v");
//! let bytes = rec.encode().unwrap();
//!
//! let mut cur = Cursor::new(bytes);
//! let back = Record::read_from(&mut cur).unwrap().unwrap();
//! assert_eq!(back, rec);
//! assert_eq!(back.op, Op::Set);
//! ```

use byteorder::{BigEndian, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};
use thiserror::Error;

/// Upper bound on a single record payload (64 MiB). A length prefix above
/// this is treated as corruption rather than an allocation request.
pub const MAX_RECORD_BYTES: i64 = 64 * 1024 * 1024;

/// The kind of mutation a record carries.
///
/// Serialized as the strings `"set"` and `"del"`; these spellings are part
/// of the on-disk format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    /// Insert or overwrite a key.
    Set,
    /// Delete a key (tombstone; the value field is empty).
    Del,
}

/// A single mutation record: operation, key, value.
///
/// For [`Op::Del`] the value is always the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// The operation kind.
    #[serde(rename = "Operation")]
    pub op: Op,
    /// The lookup key.
    #[serde(rename = "Key")]
    pub key: String,
    /// The payload value (empty for deletions).
    #[serde(rename = "Value")]
    pub value: String,
}

/// Errors that can occur while encoding or decoding records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended inside a length prefix or payload.
    #[error("truncated record")]
    Truncated,

    /// A length prefix that cannot belong to a valid record.
    #[error("unreasonable record length {0}")]
    BadLength(i64),

    /// The payload was not a valid record document (bad JSON, missing
    /// fields, or an unknown operation).
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl Record {
    /// Builds a `set` record.
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            op: Op::Set,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Builds a `del` tombstone record (empty value).
    pub fn del(key: impl Into<String>) -> Self {
        Self {
            op: Op::Del,
            key: key.into(),
            value: String::new(),
        }
    }

    /// Serializes the record into its framed wire form: an 8-byte big-endian
    /// length followed by the JSON payload.
    pub fn encode(&self) -> Result<Vec<u8>, RecordError> {
        let payload = serde_json::to_vec(self)?;
        let mut buf = Vec::with_capacity(payload.len() + 8);
        buf.write_i64::<BigEndian>(payload.len() as i64)?;
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Encodes the record and writes it to `w` in a single `write_all`.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), RecordError> {
        let frame = self.encode()?;
        w.write_all(&frame)?;
        Ok(())
    }

    /// Reads the next record from `r`.
    ///
    /// # Termination
    ///
    /// - Clean EOF exactly at a record boundary yields `Ok(None)`.
    /// - EOF inside the length prefix or payload yields
    ///   [`RecordError::Truncated`].
    /// - A non-positive or absurd length prefix yields
    ///   [`RecordError::BadLength`].
    /// - A payload that does not parse as a record document (including an
    ///   unknown operation string) yields [`RecordError::Malformed`].
    pub fn read_from<R: Read>(r: &mut R) -> Result<Option<Record>, RecordError> {
        let mut len_buf = [0u8; 8];
        if !fill_or_eof(r, &mut len_buf)? {
            return Ok(None);
        }

        let len = i64::from_be_bytes(len_buf);
        if len <= 0 || len > MAX_RECORD_BYTES {
            return Err(RecordError::BadLength(len));
        }

        let mut payload = vec![0u8; len as usize];
        r.read_exact(&mut payload).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                RecordError::Truncated
            } else {
                RecordError::Io(e)
            }
        })?;

        let record = serde_json::from_slice(&payload)?;
        Ok(Some(record))
    }
}

/// Fills `buf` completely, returning `Ok(false)` when the stream is already
/// exhausted (no bytes at all) and `Truncated` when it ends partway through.
fn fill_or_eof<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<bool, RecordError> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => {
                return if filled == 0 {
                    Ok(false)
                } else {
                    Err(RecordError::Truncated)
                };
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(RecordError::Io(e)),
        }
    }
    Ok(true)
}
