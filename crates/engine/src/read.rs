//! Read path: `get()` across all tiers.

use memtable::Entry;
use record::Op;

use crate::{Result, Store, StoreError};

impl Store {
    /// Looks up the live value for a key.
    ///
    /// Tiers are consulted freshest-first: the memtable, then the loaded
    /// segment maps from the highest index down, then on-disk segments
    /// below the loaded window from newest to oldest. The first tier that
    /// mentions the key decides the outcome: a live entry returns its
    /// value, a tombstone returns [`StoreError::KeyDeleted`]. A key no
    /// tier mentions returns [`StoreError::KeyNotFound`].
    ///
    /// # Errors
    ///
    /// Besides the two logical outcomes, propagates I/O and corruption
    /// errors from on-disk segment scans.
    pub fn get(&self, key: &str) -> Result<String> {
        if let Some(entry) = self.mem.get(key) {
            return entry_outcome(entry);
        }

        for map in self.loaded.iter().rev() {
            if let Some(entry) = map.get(key) {
                return entry_outcome(entry);
            }
        }

        // Below the loaded window: scan segment files newest to oldest.
        for idx in (0..self.load_idx).rev() {
            let path = sstable::segment_path(&self.config.segment_dir, idx);
            if let Some(entry) = sstable::scan_for_key(&path, self.config.format, key)? {
                return entry_outcome(&entry);
            }
        }

        Err(StoreError::KeyNotFound)
    }
}

fn entry_outcome(entry: &Entry) -> Result<String> {
    match entry.op {
        Op::Set => Ok(entry.value.clone()),
        Op::Del => Err(StoreError::KeyDeleted),
    }
}
