//! Write path: `set()`, `delete()`, `force_flush()`, and the internal
//! `flush()`.
//!
//! All mutations flow through here. Each one is appended to the WAL first,
//! then applied to the memtable; once the memtable outgrows the flush
//! threshold it is published as a new segment and the WAL is truncated.

use record::Record;
use sstable::SegmentMap;
use tracing::debug;

use crate::{Result, Store};

impl Store {
    /// Inserts or overwrites a key.
    ///
    /// The record is appended to the WAL before the memtable insert; once
    /// this returns, the mutation is durable and visible to subsequent
    /// gets. May trigger a flush.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.wal.append(&Record::set(key, value))?;
        self.mem.set(key, value);
        self.maybe_flush()
    }

    /// Deletes a key, returning the value it held.
    ///
    /// The prior value is resolved first; if the key is already absent or
    /// deleted, that outcome comes back unchanged and nothing is written.
    /// Otherwise a tombstone is logged and inserted into the memtable,
    /// masking the key in every older tier. May trigger a flush.
    pub fn delete(&mut self, key: &str) -> Result<String> {
        let prior = self.get(key)?;

        self.wal.append(&Record::del(key))?;
        self.mem.delete(key);
        self.maybe_flush()?;

        Ok(prior)
    }

    /// Publishes the memtable as a new segment regardless of size. A no-op
    /// when the memtable is empty.
    pub fn force_flush(&mut self) -> Result<()> {
        if self.mem.is_empty() {
            return Ok(());
        }
        self.flush()
    }

    /// Flushes once the memtable holds strictly more entries than the
    /// threshold; at exactly the threshold nothing happens.
    fn maybe_flush(&mut self) -> Result<()> {
        if self.mem.len() > self.config.flush_threshold {
            self.flush()?;
        }
        Ok(())
    }

    /// Converts the current memtable into segment `segment_count`.
    ///
    /// The ordering is load-bearing for crash safety: publish the segment
    /// (write, fsync, rename), then clear the memtable, then truncate the
    /// WAL. A crash between rename and truncate only means the next replay
    /// re-inserts records the segment already holds, which the freshest-
    /// first lookup order makes invisible. A crash before the rename
    /// leaves a `.tmp` file for startup to purge, with the WAL intact.
    pub(crate) fn flush(&mut self) -> Result<()> {
        let index = self.segment_count;
        let path = sstable::write_segment(
            &self.config.segment_dir,
            index,
            self.config.format,
            &self.mem,
        )?;
        self.segment_count += 1;

        self.mem.clear();
        self.wal.reset()?;

        // Register the new segment in the loaded window, evicting the
        // oldest map once the window is full.
        let map = SegmentMap::load(&path, self.config.format)?;
        self.loaded.push_back(map);
        if (self.loaded.len() as u64) > self.config.load_count {
            self.loaded.pop_front();
            self.load_idx += 1;
        }

        debug!(segment = index, "memtable flushed");
        Ok(())
    }
}
