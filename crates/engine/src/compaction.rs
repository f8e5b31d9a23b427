//! Size-triggered compaction: pairwise merges until the segment count is
//! within the configured threshold.
//!
//! Runs automatically inside [`Store::start`] and [`Store::stop`]; callers
//! can also trigger it manually through [`Store::compact`].

use sstable::{segment_path, Format, SegmentError};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::{Result, Store};

/// Runs the compaction loop over `dir`, returning the final segment count.
///
/// Each pass walks the segments bottom-up, merging adjacent pairs:
/// `(0,1) -> 0`, `(2,3) -> 1`, and so on. An odd tail is renamed down to
/// `SST{n/2}.sst` so indices stay dense. One pass takes n segments to
/// ceil(n/2), so the loop terminates; it repeats while the count still
/// exceeds `merge_threshold` and is a no-op otherwise.
pub(crate) fn compact_segments(
    dir: &Path,
    format: Format,
    merge_threshold: u64,
) -> std::result::Result<u64, SegmentError> {
    let mut n = sstable::check_and_clean(dir)?;

    while n > merge_threshold {
        debug!(segments = n, "compaction pass");

        let mut i = 0;
        while i + 1 < n {
            sstable::merge_segments(dir, i, i + 1, format)?;
            i += 2;
        }

        if n % 2 == 1 {
            fs::rename(segment_path(dir, n - 1), segment_path(dir, n / 2))?;
        }

        n = sstable::check_and_clean(dir)?;
    }

    Ok(n)
}

impl Store {
    /// Compacts the segment files and reloads the in-memory window to match
    /// the renumbered directory.
    ///
    /// The memtable and WAL are untouched; only segment state changes.
    pub fn compact(&mut self) -> Result<()> {
        let n = compact_segments(
            &self.config.segment_dir,
            self.config.format,
            self.config.merge_threshold,
        )?;

        self.segment_count = n;
        self.load_idx = n.saturating_sub(self.config.load_count);
        self.loaded = Self::load_window(
            &self.config.segment_dir,
            self.config.format,
            self.load_idx,
            n,
        )?;

        Ok(())
    }
}
