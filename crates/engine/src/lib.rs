//! # Engine - CrestKV Storage Engine
//!
//! The central orchestrator that ties the [`record`], [`wal`], [`memtable`],
//! and [`sstable`] crates into a persistent ordered key-value store.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   |
//!   v
//! ┌─────────────────────────────────────────────────┐
//! │                    STORE                        │
//! │                                                 │
//! │ write.rs → WAL append → Memtable insert         │
//! │              |                                  │
//! │              |  (entries > flush threshold?)    │
//! │              |            yes                   │
//! │              v                                  │
//! │           flush() → SST{n}.sst, WAL reset       │
//! │                                                 │
//! │ read.rs → Memtable → loaded maps → disk scans   │
//! │            (freshest tier wins)                 │
//! │                                                 │
//! │ compaction.rs → pairwise merges at start/stop   │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module          | Purpose                                            |
//! |-----------------|----------------------------------------------------|
//! | `lib.rs`        | `Store` struct, start/stop, accessors, `Debug`     |
//! | [`config`]      | All tunables as constructor parameters             |
//! | [`error`]       | `StoreError` with distinct logical outcomes        |
//! | `recovery`      | WAL replay and the segment preload window          |
//! | `write`         | `set()`, `delete()`, `force_flush()`, `flush()`    |
//! | `read`          | `get()` across all tiers                           |
//! | `compaction`    | Pairwise merge loop, manual `compact()`            |
//!
//! ## Lookup tiers
//!
//! ```text
//! ┌────────────────────────────────┐  ← freshest, checked first
//! │ MEMTABLE                       │
//! ├────────────────────────────────┤  ← segments [load_idx, n), newest
//! │ LOADED SEGMENT MAPS            │    index first
//! ├────────────────────────────────┤  ← segments [0, load_idx), scanned
//! │ ON-DISK SEGMENTS               │    on disk, newest first
//! └────────────────────────────────┘
//! ```
//!
//! ## Crash Safety
//!
//! Every mutation is appended to the WAL **before** the memtable update.
//! Flushes publish the new segment (tmp + fsync + rename) before clearing
//! the memtable and truncating the WAL; a crash between those steps only
//! means replay re-applies records the segment already holds, and the
//! lookup order makes that invisible. Unpublished `.tmp` segments are
//! purged on startup.
//!
//! ## Concurrency
//!
//! The store is single-writer: mutations, flushes, and compactions run
//! serially through `&mut self`. The one piece of internal parallelism is
//! startup, where WAL replay and the segment preload run side by side and
//! join before [`Store::start`] returns.

mod compaction;
mod config;
mod error;
mod read;
mod recovery;
mod write;

pub use config::Config;
pub use error::{Result, StoreError};
pub use sstable::Format;

use memtable::Memtable;
use sstable::SegmentMap;
use std::collections::VecDeque;
use std::fmt;
use std::thread;
use tracing::info;
use wal::Wal;

/// The storage engine façade coordinating memtable, WAL, and segments.
///
/// Created with [`Store::start`], torn down with [`Store::stop`]. `stop`
/// consumes the value, so using a store after stopping it is a compile
/// error rather than a runtime precondition violation.
pub struct Store {
    config: Config,
    mem: Memtable,
    wal: Wal,

    /// Number of published segments; their names are `SST0.sst` through
    /// `SST{segment_count - 1}.sst`.
    segment_count: u64,

    /// Index of the first segment held in the loaded window. Segments below
    /// it are scanned on disk.
    load_idx: u64,

    /// Loaded lookup maps for segments `[load_idx, segment_count)`, oldest
    /// first.
    loaded: VecDeque<SegmentMap>,
}

impl Store {
    /// Opens the store.
    ///
    /// # Startup Steps
    ///
    /// 1. Compact the pre-existing segment directory (a no-op when the
    ///    count is within the merge threshold).
    /// 2. `check_and_clean` for the authoritative segment count, purging
    ///    any `.tmp` leftovers.
    /// 3. Concurrently replay the WAL into a fresh memtable and load the
    ///    newest `load_count` segments into memory; join both.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures, WAL corruption (including a partial tail
    /// record), and segment header mismatches. All of them abort startup;
    /// nothing is silently truncated or skipped.
    pub fn start(config: Config) -> Result<Self> {
        compaction::compact_segments(
            &config.segment_dir,
            config.format,
            config.merge_threshold,
        )?;
        let segment_count = sstable::check_and_clean(&config.segment_dir)?;
        let load_idx = segment_count.saturating_sub(config.load_count);

        let mut wal = Wal::open(&config.wal_path, config.wal_sync)?;
        let mut mem = Memtable::new();

        // WAL replay and segment preload are independent; run them side by
        // side and join both before returning. This is the only parallelism
        // inside the engine.
        let (replayed, loaded) = thread::scope(|s| -> Result<(usize, VecDeque<SegmentMap>)> {
            let dir = config.segment_dir.as_path();
            let format = config.format;
            let loader = s.spawn(move || Self::load_window(dir, format, load_idx, segment_count));

            let replayed = Self::replay_wal(&mut wal, &mut mem)?;
            let loaded = loader.join().expect("segment preload thread panicked")?;
            Ok((replayed, loaded))
        })?;
        wal.seek_end()?;

        info!(
            replayed,
            segments = segment_count,
            loaded = loaded.len(),
            "store started"
        );

        Ok(Self {
            config,
            mem,
            wal,
            segment_count,
            load_idx,
            loaded,
        })
    }

    /// Shuts the store down: syncs and closes the WAL, then compacts the
    /// segment directory.
    ///
    /// Unflushed memtable entries are not lost; the WAL still carries them
    /// and the next [`Store::start`] replays them.
    pub fn stop(self) -> Result<()> {
        let Store { wal, config, .. } = self;
        wal.close()?;
        compaction::compact_segments(&config.segment_dir, config.format, config.merge_threshold)?;
        info!("store stopped");
        Ok(())
    }

    /// Number of published segments.
    #[must_use]
    pub fn segment_count(&self) -> u64 {
        self.segment_count
    }

    /// Number of segments currently held in memory as lookup maps.
    #[must_use]
    pub fn loaded_segment_count(&self) -> usize {
        self.loaded.len()
    }

    /// Number of entries in the memtable, tombstones included.
    #[must_use]
    pub fn memtable_len(&self) -> usize {
        self.mem.len()
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("wal_path", &self.config.wal_path)
            .field("segment_dir", &self.config.segment_dir)
            .field("memtable_entries", &self.mem.len())
            .field("segment_count", &self.segment_count)
            .field("load_idx", &self.load_idx)
            .field("loaded_segments", &self.loaded.len())
            .field("flush_threshold", &self.config.flush_threshold)
            .field("merge_threshold", &self.config.merge_threshold)
            .finish()
    }
}

#[cfg(test)]
mod tests;
