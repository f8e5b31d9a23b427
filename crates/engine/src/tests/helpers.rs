use crate::Config;
use std::fs;
use std::path::Path;

/// Config rooted inside a test directory. WAL fsync is off so tests run at
/// memory speed; durability across a dropped handle is still exercised
/// because the data sits in the page cache.
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.wal_path = root.join("mydb.wal");
    config.segment_dir = root.join("SSTFiles");
    config.wal_sync = false;
    config
}

pub fn count_segment_files(dir: &Path) -> usize {
    segment_names(dir).len()
}

/// Sorted names of the published segment files in `dir`.
pub fn segment_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "sst").unwrap_or(false))
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
        .collect();
    names.sort();
    names
}
