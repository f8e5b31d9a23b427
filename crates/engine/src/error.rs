//! Unified error type for store operations.

use sstable::SegmentError;
use thiserror::Error;
use wal::WalError;

/// Result type alias using [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for store operations.
///
/// The two logical lookup outcomes are modeled as error variants so callers
/// can distinguish "no value" from real failures without a wrapper enum;
/// this mirrors the sentinel errors of the wire-compatible deployment.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key is not present in any tier.
    #[error("key not found")]
    KeyNotFound,

    /// The latest record for the key is a tombstone.
    #[error("key deleted")]
    KeyDeleted,

    /// An underlying filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A WAL failure (I/O or corruption during replay).
    #[error("wal: {0}")]
    Wal(#[from] WalError),

    /// A segment failure (I/O, bad header, or corruption).
    #[error("segment: {0}")]
    Segment(#[from] SegmentError),
}

impl StoreError {
    /// `true` for the logical lookup outcomes ([`KeyNotFound`] and
    /// [`KeyDeleted`]), `false` for real failures.
    ///
    /// [`KeyNotFound`]: StoreError::KeyNotFound
    /// [`KeyDeleted`]: StoreError::KeyDeleted
    #[must_use]
    pub fn is_logical(&self) -> bool {
        matches!(self, StoreError::KeyNotFound | StoreError::KeyDeleted)
    }
}
