//! # SSTable - Sorted Segment Files
//!
//! Immutable, on-disk storage files for the CrestKV storage engine.
//!
//! When the in-memory [`memtable::Memtable`] outgrows its entry threshold
//! the engine flushes it to disk as a segment. Segments are *write-once,
//! read-many*: once published they are never modified, only replaced by
//! compaction.
//!
//! ## File layout
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ HEADER (24 bytes)                            │
//! │                                              │
//! │ magic   (u64 LE)   constant per deployment   │
//! │ version (u64 LE)   must match the reader's   │
//! │ count   (u64 LE)   number of records         │
//! ├──────────────────────────────────────────────┤
//! │ count records, in ascending key order:       │
//! │                                              │
//! │ len     (i64 BE)                             │
//! │ payload (len bytes of record JSON)           │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Header integers are little-endian while record length prefixes are
//! big-endian. The mismatch is deliberate: it keeps the files bit-compatible
//! with data written by earlier deployments of this format.
//!
//! Segments live in one directory as `SST{index}.sst` with indices dense
//! from 0; a larger index means a newer segment. A file still carrying the
//! `.tmp` extension was never published and is discarded on startup by
//! [`check_and_clean`].

mod dir;
mod format;
mod merge;
mod reader;
mod writer;

pub use dir::{check_and_clean, segment_path, tmp_path, SEGMENT_EXT, TMP_EXT};
pub use format::{Format, COUNT_OFFSET, HEADER_BYTES, SEGMENT_MAGIC, SEGMENT_VERSION};
pub use merge::merge_segments;
pub use reader::{scan_for_key, SegmentMap};
pub use writer::write_segment;

use record::RecordError;
use thiserror::Error;

/// Errors that can occur while reading, writing, or merging segments.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the expected magic number: it is not a
    /// segment of this store.
    #[error("invalid segment: bad magic {found:#018x}")]
    BadMagic { found: u64 },

    /// The segment was written by an incompatible version of the format.
    #[error("incompatible segment version {found} (expected {expected})")]
    BadVersion { found: u64, expected: u64 },

    /// A record inside the segment failed to decode.
    #[error("{0}")]
    Record(#[from] RecordError),

    /// The file ended before the record count promised by its header.
    #[error("segment ended after {read} of {expected} records")]
    Truncated { expected: u64, read: u64 },
}

#[cfg(test)]
mod tests;
