//! # WAL - Write-Ahead Log
//!
//! Provides crash-safe durability for the CrestKV storage engine.
//!
//! Every mutation (`set` or `del`) is appended to the WAL **before** the
//! corresponding in-memory update. On restart the WAL is replayed to
//! reconstruct the memtable, guaranteeing that no acknowledged write is
//! lost. After a successful flush to a segment file the engine truncates the
//! WAL back to zero length via [`Wal::reset`].
//!
//! The log is a headerless sequence of framed records (see the `record`
//! crate for the wire form). A single [`Wal`] handle owns the file
//! exclusively and serves both roles: sequential replay from the start and
//! appending at the end. The engine is the only appender; the WAL itself
//! enforces no ordering beyond "appends happen in call order".
//!
//! ## Example
//!
//! ```rust,no_run
//! use record::Record;
//! use wal::Wal;
//!
//! let mut wal = Wal::open("mydb.wal", true).unwrap();
//! wal.append(&Record::set("hello", "world")).unwrap();
//!
//! let mut restored = Vec::new();
//! wal.replay(|rec| restored.push(rec)).unwrap();
//! ```

use record::{Record, RecordError};
use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during WAL operations.
#[derive(Debug, Error)]
pub enum WalError {
    /// An underlying I/O error on open, seek, truncate, or write.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A record failed to encode or decode. During replay this covers a
    /// truncated tail just as much as a malformed payload; the engine
    /// treats both as corruption.
    #[error("{0}")]
    Record(#[from] RecordError),
}

/// An exclusively-owned WAL file handle.
///
/// When `sync` is `true`, every append is followed by `sync_all()` (fsync)
/// so the record is durable before the call returns.
pub struct Wal {
    file: File,
    sync: bool,
}

impl Wal {
    /// Opens (or creates) the WAL file for reading and appending.
    ///
    /// The cursor position after open is unspecified; callers replay from
    /// [`seek_start`](Wal::seek_start) or append (which seeks to the end
    /// itself).
    pub fn open<P: AsRef<Path>>(path: P, sync: bool) -> Result<Self, WalError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(Self { file, sync })
    }

    /// Appends one record at the end of the log.
    ///
    /// Seeks to end-of-file first, then writes the whole frame in a single
    /// `write_all`. Once this returns, the mutation is committed from the
    /// engine's point of view.
    pub fn append(&mut self, record: &Record) -> Result<(), WalError> {
        self.file.seek(SeekFrom::End(0))?;
        let frame = record.encode()?;
        self.file.write_all(&frame)?;
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }

    /// Reads the next record at the current cursor position.
    ///
    /// Returns `Ok(None)` when the file is exhausted at a record boundary.
    /// A partial tail record surfaces as `WalError::Record`.
    pub fn read_next(&mut self) -> Result<Option<Record>, WalError> {
        Ok(Record::read_from(&mut self.file)?)
    }

    /// Repositions the cursor at the start of the log.
    pub fn seek_start(&mut self) -> Result<(), WalError> {
        self.file.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    /// Repositions the cursor at the end of the log.
    pub fn seek_end(&mut self) -> Result<(), WalError> {
        self.file.seek(SeekFrom::End(0))?;
        Ok(())
    }

    /// Replays every record from the start of the log, calling `apply` for
    /// each, and returns how many records were seen. The cursor is left at
    /// the end of the log, ready for appends.
    pub fn replay<F>(&mut self, mut apply: F) -> Result<usize, WalError>
    where
        F: FnMut(Record),
    {
        self.seek_start()?;
        let mut count = 0;
        while let Some(rec) = self.read_next()? {
            apply(rec);
            count += 1;
        }
        Ok(count)
    }

    /// Truncates the log to zero length and repositions at the start.
    ///
    /// Only invoked by the engine after a successful flush; the flushed
    /// records are durable in the new segment by then.
    pub fn reset(&mut self) -> Result<(), WalError> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }

    /// Forces all buffered data to disk via `sync_all()`.
    pub fn sync(&mut self) -> Result<(), WalError> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Syncs and closes the log. Dropping a `Wal` also closes the file, but
    /// without the final fsync.
    pub fn close(self) -> Result<(), WalError> {
        self.file.sync_all()?;
        Ok(())
    }
}
