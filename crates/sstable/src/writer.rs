use memtable::Memtable;
use record::Record;
use std::fs::{self, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::dir::{segment_path, tmp_path};
use crate::format::{write_header, Format};
use crate::SegmentError;

/// Serializes an ordered snapshot of the memtable into segment `index`,
/// returning the published path.
///
/// The file is written as `SST{index}.tmp` (header, then one record per
/// memtable entry in ascending key order), fsynced, and renamed to
/// `SST{index}.sst`. The rename is the atomic publication point: a crash
/// before it leaves a `.tmp` file that the next startup discards, a crash
/// after it leaves a complete, durable segment.
///
/// Tombstones are written out like any other entry so the new segment masks
/// older values of deleted keys. Nothing is deduplicated against older
/// segments; the newest-first lookup order takes care of shadowing.
pub fn write_segment(
    dir: &Path,
    index: u64,
    format: Format,
    mem: &Memtable,
) -> Result<PathBuf, SegmentError> {
    let tmp = tmp_path(dir, index);
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)?;
    let mut w = BufWriter::new(file);

    write_header(&mut w, format, mem.len() as u64)?;

    for (key, entry) in mem.iter() {
        let rec = Record {
            op: entry.op,
            key: key.clone(),
            value: entry.value.clone(),
        };
        rec.write_to(&mut w)?;
    }

    let file = w.into_inner().map_err(|e| SegmentError::Io(e.into_error()))?;
    file.sync_all()?;
    drop(file);

    let dest = segment_path(dir, index);
    fs::rename(&tmp, &dest)?;
    Ok(dest)
}
