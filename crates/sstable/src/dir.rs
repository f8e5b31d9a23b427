//! Segment directory bookkeeping: naming, startup cleanup, counting.
//!
//! Published segments are named `SST{index}.sst` with indices dense from 0
//! to count-1; compaction maintains that density. Index order is recency
//! order: a higher index was written later.

use std::fs;
use std::path::{Path, PathBuf};

use crate::SegmentError;

/// Extension of a published segment file.
pub const SEGMENT_EXT: &str = "sst";

/// Extension of a segment still under construction. Files left with this
/// extension after a crash were never published and are purged on startup.
pub const TMP_EXT: &str = "tmp";

/// Path of the published segment with the given index.
pub fn segment_path(dir: &Path, index: u64) -> PathBuf {
    dir.join(format!("SST{}.{}", index, SEGMENT_EXT))
}

/// Path a segment is written under before its publishing rename.
pub fn tmp_path(dir: &Path, index: u64) -> PathBuf {
    dir.join(format!("SST{}.{}", index, TMP_EXT))
}

/// Ensures the segment directory exists, deletes leftover `.tmp` files from
/// interrupted writes, and returns the number of published segments.
///
/// The returned count is authoritative: callers may assume the surviving
/// files are exactly `SST0.sst` through `SST{count-1}.sst`, an invariant
/// the flush and compaction paths maintain.
pub fn check_and_clean(dir: &Path) -> Result<u64, SegmentError> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        return Ok(0);
    }

    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        match path.extension().and_then(|e| e.to_str()) {
            Some(TMP_EXT) => fs::remove_file(&path)?,
            Some(SEGMENT_EXT) => count += 1,
            _ => {}
        }
    }
    Ok(count)
}
