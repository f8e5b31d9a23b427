//! Cold-start helpers: WAL replay and the segment preload window.

use memtable::Memtable;
use record::Op;
use sstable::{Format, SegmentError, SegmentMap};
use std::collections::VecDeque;
use std::path::Path;
use wal::Wal;

use crate::{Result, Store};

impl Store {
    /// Replays the whole WAL into `mem`, returning how many records were
    /// applied. Replay is idempotent: entries are last-writer-wins, so
    /// records that a published segment already holds just overwrite
    /// themselves.
    ///
    /// A partial tail record is a corruption error, not a silent stop; the
    /// caller decides what to do with a damaged log.
    pub(crate) fn replay_wal(wal: &mut Wal, mem: &mut Memtable) -> Result<usize> {
        let count = wal.replay(|rec| match rec.op {
            Op::Set => mem.set(rec.key, rec.value),
            Op::Del => mem.delete(rec.key),
        })?;
        Ok(count)
    }

    /// Loads segments `[load_idx, count)` into lookup maps, oldest first.
    pub(crate) fn load_window(
        dir: &Path,
        format: Format,
        load_idx: u64,
        count: u64,
    ) -> std::result::Result<VecDeque<SegmentMap>, SegmentError> {
        let mut maps = VecDeque::with_capacity((count - load_idx) as usize);
        for idx in load_idx..count {
            let path = sstable::segment_path(dir, idx);
            maps.push_back(SegmentMap::load(&path, format)?);
        }
        Ok(maps)
    }
}
