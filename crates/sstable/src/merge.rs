//! Pairwise streaming merge of two adjacent segments.
//!
//! This is the primitive the compaction loop drives: merge segments `i` and
//! `i+1` into a single segment at index `i/2`. Each input is read
//! sequentially with one look-ahead record; memory usage is bounded by two
//! records regardless of segment size.

use byteorder::{LittleEndian, WriteBytesExt};
use record::Record;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Seek, SeekFrom};
use std::path::Path;

use crate::dir::{segment_path, tmp_path};
use crate::format::{read_header, write_header, Format, COUNT_OFFSET};
use crate::SegmentError;

/// One merge input: a buffered reader positioned after the header, plus how
/// many records the header still promises.
struct SegmentStream {
    reader: BufReader<File>,
    remaining: u64,
    total: u64,
}

impl SegmentStream {
    fn open(path: &Path, format: Format) -> Result<Self, SegmentError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let total = read_header(&mut reader, format)?;
        Ok(Self {
            reader,
            remaining: total,
            total,
        })
    }

    fn next(&mut self) -> Result<Option<Record>, SegmentError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        match Record::read_from(&mut self.reader)? {
            Some(rec) => {
                self.remaining -= 1;
                Ok(Some(rec))
            }
            None => Err(SegmentError::Truncated {
                expected: self.total,
                read: self.total - self.remaining,
            }),
        }
    }
}

/// Merges segments `i` and `j` (`j = i + 1`, the newer of the two) into a
/// new segment at index `i/2`.
///
/// Both input headers are validated up front. Records stream out in
/// ascending key order; when the same key appears in both inputs only the
/// newer input's record is kept, so the output never carries duplicate
/// keys. The exact emitted count is patched into the destination header
/// before the fsync.
///
/// The destination is written as `SST{i/2}.tmp` and renamed once durable;
/// the inputs are removed only after the rename. A crash mid-merge
/// therefore leaves either both inputs intact (plus a `.tmp` for startup to
/// purge) or the merged segment published.
pub fn merge_segments(dir: &Path, i: u64, j: u64, format: Format) -> Result<(), SegmentError> {
    let left_path = segment_path(dir, i);
    let right_path = segment_path(dir, j);

    let mut left = SegmentStream::open(&left_path, format)?;
    let mut right = SegmentStream::open(&right_path, format)?;

    let tmp = tmp_path(dir, i / 2);
    let out_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)?;
    let mut out = BufWriter::new(out_file);

    // Provisional count; the sum over-counts by one per key tie and is
    // patched below once the real number is known.
    write_header(&mut out, format, left.remaining + right.remaining)?;

    let mut emitted: u64 = 0;
    let mut a = left.next()?;
    let mut b = right.next()?;

    loop {
        match (a.take(), b.take()) {
            (Some(ra), Some(rb)) => {
                if ra.key < rb.key {
                    ra.write_to(&mut out)?;
                    emitted += 1;
                    a = left.next()?;
                    b = Some(rb);
                } else if rb.key < ra.key {
                    rb.write_to(&mut out)?;
                    emitted += 1;
                    a = Some(ra);
                    b = right.next()?;
                } else {
                    // same key in both inputs: the newer segment wins
                    rb.write_to(&mut out)?;
                    emitted += 1;
                    a = left.next()?;
                    b = right.next()?;
                }
            }
            (Some(ra), None) => {
                ra.write_to(&mut out)?;
                emitted += 1;
                a = left.next()?;
            }
            (None, Some(rb)) => {
                rb.write_to(&mut out)?;
                emitted += 1;
                b = right.next()?;
            }
            (None, None) => break,
        }
    }

    let mut out_file = out
        .into_inner()
        .map_err(|e| SegmentError::Io(e.into_error()))?;
    out_file.seek(SeekFrom::Start(COUNT_OFFSET))?;
    out_file.write_u64::<LittleEndian>(emitted)?;
    out_file.sync_all()?;
    drop(out_file);

    // Release the input handles before renaming over or removing them.
    drop(left);
    drop(right);

    let dest = segment_path(dir, i / 2);
    fs::rename(&tmp, &dest)?;

    // Inputs go away only after the merged segment is published. Merging
    // (0, 1) republishes index 0 in place, so the left input is already the
    // destination there.
    if left_path != dest {
        fs::remove_file(&left_path)?;
    }
    fs::remove_file(&right_path)?;

    Ok(())
}
