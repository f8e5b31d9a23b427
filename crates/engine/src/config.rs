use sstable::Format;
use std::path::PathBuf;

/// Tunables for a [`Store`](crate::Store) instance.
///
/// The wire-compatible deployment of this format shipped these as package
/// constants; here every one of them is a constructor parameter, with
/// `Default` reproducing the deployed values.
#[derive(Debug, Clone)]
pub struct Config {
    /// WAL file path.
    pub wal_path: PathBuf,

    /// Directory holding the segment files.
    pub segment_dir: PathBuf,

    /// Flush the memtable once it holds strictly more than this many
    /// entries. At exactly the threshold nothing happens.
    pub flush_threshold: usize,

    /// How many of the newest segments are kept in memory as lookup maps.
    /// Older segments are scanned on disk.
    pub load_count: u64,

    /// Compaction keeps merging while the segment count exceeds this.
    pub merge_threshold: u64,

    /// fsync the WAL after every append.
    pub wal_sync: bool,

    /// On-disk format parameters (magic and version) for segment files.
    pub format: Format,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wal_path: PathBuf::from("mydb.wal"),
            segment_dir: PathBuf::from("SSTFiles"),
            flush_threshold: 1000,
            load_count: 1000,
            merge_threshold: 10,
            wal_sync: true,
            format: Format::default(),
        }
    }
}
