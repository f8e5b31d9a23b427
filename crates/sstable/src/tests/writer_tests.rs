use crate::format::read_header;
use crate::*;
use memtable::Memtable;
use record::{Op, Record};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tempfile::tempdir;

// -------------------- Helpers --------------------

fn sample_memtable() -> Memtable {
    let mut mem = Memtable::new();
    mem.set("b", "banana");
    mem.set("a", "apple");
    mem.set("c", ""); // present but empty value
    mem.delete("d"); // tombstone
    mem
}

fn read_all_records(path: &Path) -> Vec<Record> {
    let mut r = BufReader::new(File::open(path).unwrap());
    let count = read_header(&mut r, Format::default()).unwrap();
    (0..count)
        .map(|_| Record::read_from(&mut r).unwrap().unwrap())
        .collect()
}

// -------------------- Publication --------------------

#[test]
fn publishes_under_final_name_with_no_tmp_left() {
    let dir = tempdir().unwrap();
    let path = write_segment(dir.path(), 0, Format::default(), &sample_memtable()).unwrap();

    assert_eq!(path, dir.path().join("SST0.sst"));
    assert!(path.exists());
    assert!(!dir.path().join("SST0.tmp").exists());
}

#[test]
fn index_appears_in_the_file_name() {
    let dir = tempdir().unwrap();
    let path = write_segment(dir.path(), 7, Format::default(), &sample_memtable()).unwrap();
    assert_eq!(path, dir.path().join("SST7.sst"));
}

// -------------------- Header --------------------

#[test]
fn header_carries_magic_version_and_count() {
    let dir = tempdir().unwrap();
    let path = write_segment(dir.path(), 0, Format::default(), &sample_memtable()).unwrap();

    let raw = std::fs::read(&path).unwrap();
    assert_eq!(&raw[0..8], &SEGMENT_MAGIC.to_le_bytes());
    assert_eq!(&raw[8..16], &SEGMENT_VERSION.to_le_bytes());
    assert_eq!(&raw[16..24], &4u64.to_le_bytes());
}

#[test]
fn custom_format_is_written_verbatim() {
    let dir = tempdir().unwrap();
    let format = Format {
        magic: 0xDEAD_BEEF,
        version: 2,
    };
    let path = write_segment(dir.path(), 0, format, &sample_memtable()).unwrap();

    let raw = std::fs::read(&path).unwrap();
    assert_eq!(&raw[0..8], &0xDEAD_BEEFu64.to_le_bytes());
    assert_eq!(&raw[8..16], &2u64.to_le_bytes());
}

// -------------------- Record section --------------------

#[test]
fn records_are_in_ascending_key_order() {
    let dir = tempdir().unwrap();
    let path = write_segment(dir.path(), 0, Format::default(), &sample_memtable()).unwrap();

    let recs = read_all_records(&path);
    let keys: Vec<&str> = recs.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b", "c", "d"]);
}

#[test]
fn tombstones_are_preserved() {
    let dir = tempdir().unwrap();
    let path = write_segment(dir.path(), 0, Format::default(), &sample_memtable()).unwrap();

    let recs = read_all_records(&path);
    let tomb = recs.iter().find(|r| r.key == "d").unwrap();
    assert_eq!(tomb.op, Op::Del);
    assert_eq!(tomb.value, "");
}

#[test]
fn empty_memtable_writes_a_headed_empty_segment() {
    let dir = tempdir().unwrap();
    let path = write_segment(dir.path(), 0, Format::default(), &Memtable::new()).unwrap();

    let raw = std::fs::read(&path).unwrap();
    assert_eq!(raw.len() as u64, HEADER_BYTES);
    assert_eq!(&raw[16..24], &0u64.to_le_bytes());
}
