use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

use crate::SegmentError;

/// Magic number identifying a segment file of this store.
pub const SEGMENT_MAGIC: u64 = 0x1234_5678_90AB_CDEF;

/// Current format version. Bumped whenever the layout changes
/// incompatibly; readers refuse files written under a different version.
pub const SEGMENT_VERSION: u64 = 110011;

/// Total header size: magic + version + count.
pub const HEADER_BYTES: u64 = 24;

/// Byte offset of the record-count field within the header. The merge
/// patches the count in place at this offset once the exact number of
/// emitted records is known.
pub const COUNT_OFFSET: u64 = 16;

/// On-disk format parameters. Deployments that need to fence off their
/// files can run with a different magic; version bumps gate layout changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    pub magic: u64,
    pub version: u64,
}

impl Default for Format {
    fn default() -> Self {
        Self {
            magic: SEGMENT_MAGIC,
            version: SEGMENT_VERSION,
        }
    }
}

/// Writes the segment header: magic, version, record count, all
/// little-endian u64.
pub fn write_header<W: Write>(w: &mut W, format: Format, count: u64) -> io::Result<()> {
    w.write_u64::<LittleEndian>(format.magic)?;
    w.write_u64::<LittleEndian>(format.version)?;
    w.write_u64::<LittleEndian>(count)?;
    Ok(())
}

/// Reads and validates the segment header, returning the record count.
///
/// # Errors
///
/// [`SegmentError::BadMagic`] when the file is not a segment at all,
/// [`SegmentError::BadVersion`] when it was written under an incompatible
/// format version. Both are surfaced as recoverable errors so startup can
/// report the offending file instead of aborting the process.
pub fn read_header<R: Read>(r: &mut R, format: Format) -> Result<u64, SegmentError> {
    let magic = r.read_u64::<LittleEndian>()?;
    if magic != format.magic {
        return Err(SegmentError::BadMagic { found: magic });
    }

    let version = r.read_u64::<LittleEndian>()?;
    if version != format.version {
        return Err(SegmentError::BadVersion {
            found: version,
            expected: format.version,
        });
    }

    Ok(r.read_u64::<LittleEndian>()?)
}
