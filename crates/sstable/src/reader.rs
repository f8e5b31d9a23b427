use memtable::Entry;
use record::Record;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::format::{read_header, Format};
use crate::SegmentError;

/// A whole segment loaded into memory for point lookups.
///
/// The engine keeps one of these per segment in its loaded window. Records
/// are inserted in file order, so if a file ever carried the same key twice
/// the later (newer) occurrence wins.
#[derive(Debug)]
pub struct SegmentMap {
    map: HashMap<String, Entry>,
}

impl SegmentMap {
    /// Reads a segment file into a key lookup map.
    ///
    /// The header is validated first; a wrong magic or version fails the
    /// load before any record is read.
    pub fn load(path: &Path, format: Format) -> Result<Self, SegmentError> {
        let file = File::open(path)?;
        let mut r = BufReader::new(file);
        let count = read_header(&mut r, format)?;

        // No pre-sizing from `count`: a corrupt header must not turn into a
        // giant allocation before the record reads catch it.
        let mut map = HashMap::new();
        for read in 0..count {
            match Record::read_from(&mut r)? {
                Some(rec) => {
                    map.insert(
                        rec.key,
                        Entry {
                            op: rec.op,
                            value: rec.value,
                        },
                    );
                }
                None => {
                    return Err(SegmentError::Truncated {
                        expected: count,
                        read,
                    })
                }
            }
        }

        Ok(Self { map })
    }

    /// Entry for a key, tombstones included. `None` means this segment does
    /// not mention the key at all.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.map.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Scans one segment on disk for a single key without loading it into
/// memory.
///
/// Used for segments older than the engine's loaded window. Records are
/// key-sorted, so the scan stops early as soon as the current key exceeds
/// the target: the key cannot appear later in this segment.
///
/// Tombstones surface as `Some(entry)` with `op == Op::Del`, distinct from
/// `None` (key absent from this segment).
pub fn scan_for_key(path: &Path, format: Format, key: &str) -> Result<Option<Entry>, SegmentError> {
    let file = File::open(path)?;
    let mut r = BufReader::new(file);
    let count = read_header(&mut r, format)?;

    for read in 0..count {
        match Record::read_from(&mut r)? {
            Some(rec) => {
                if rec.key == key {
                    return Ok(Some(Entry {
                        op: rec.op,
                        value: rec.value,
                    }));
                }
                if rec.key.as_str() > key {
                    return Ok(None);
                }
            }
            None => {
                return Err(SegmentError::Truncated {
                    expected: count,
                    read,
                })
            }
        }
    }

    Ok(None)
}
