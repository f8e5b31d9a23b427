use crate::format::read_header;
use crate::*;
use memtable::Memtable;
use record::{Op, Record};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tempfile::tempdir;

// -------------------- Helpers --------------------

fn write_entries(dir: &Path, index: u64, entries: &[(&str, Option<&str>)]) {
    let mut mem = Memtable::new();
    for &(key, val) in entries {
        match val {
            Some(v) => mem.set(key, v),
            None => mem.delete(key),
        }
    }
    write_segment(dir, index, Format::default(), &mem).unwrap();
}

fn read_all_records(path: &Path) -> Vec<Record> {
    let mut r = BufReader::new(File::open(path).unwrap());
    let count = read_header(&mut r, Format::default()).unwrap();
    (0..count)
        .map(|_| Record::read_from(&mut r).unwrap().unwrap())
        .collect()
}

fn header_count(path: &Path) -> u64 {
    let mut r = BufReader::new(File::open(path).unwrap());
    read_header(&mut r, Format::default()).unwrap()
}

// -------------------- Disjoint inputs --------------------

#[test]
fn merge_disjoint_pair_into_index_zero() {
    let dir = tempdir().unwrap();
    write_entries(dir.path(), 0, &[("a", Some("1")), ("c", Some("3"))]);
    write_entries(dir.path(), 1, &[("b", Some("2")), ("d", Some("4"))]);

    merge_segments(dir.path(), 0, 1, Format::default()).unwrap();

    let dest = segment_path(dir.path(), 0);
    assert!(dest.exists());
    assert!(!segment_path(dir.path(), 1).exists());
    assert!(!tmp_path(dir.path(), 0).exists());

    let recs = read_all_records(&dest);
    let keys: Vec<&str> = recs.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b", "c", "d"]);
    assert_eq!(header_count(&dest), 4);
}

#[test]
fn merge_higher_pair_lands_at_half_index() {
    let dir = tempdir().unwrap();
    write_entries(dir.path(), 2, &[("x", Some("1"))]);
    write_entries(dir.path(), 3, &[("y", Some("2"))]);

    merge_segments(dir.path(), 2, 3, Format::default()).unwrap();

    assert!(segment_path(dir.path(), 1).exists());
    assert!(!segment_path(dir.path(), 2).exists());
    assert!(!segment_path(dir.path(), 3).exists());
}

// -------------------- Key ties --------------------

#[test]
fn tie_keeps_the_newer_record_and_patches_the_count() {
    let dir = tempdir().unwrap();
    write_entries(dir.path(), 0, &[("k", Some("old")), ("only0", Some("a"))]);
    write_entries(dir.path(), 1, &[("k", Some("new")), ("only1", Some("b"))]);

    merge_segments(dir.path(), 0, 1, Format::default()).unwrap();

    let dest = segment_path(dir.path(), 0);
    // 4 input records, one tie: 3 emitted, and the header must agree
    assert_eq!(header_count(&dest), 3);

    let map = SegmentMap::load(&dest, Format::default()).unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map.get("k").unwrap().value, "new");
    assert_eq!(map.get("only0").unwrap().value, "a");
    assert_eq!(map.get("only1").unwrap().value, "b");
}

#[test]
fn newer_tombstone_masks_older_value() {
    let dir = tempdir().unwrap();
    write_entries(dir.path(), 0, &[("k", Some("alive"))]);
    write_entries(dir.path(), 1, &[("k", None)]);

    merge_segments(dir.path(), 0, 1, Format::default()).unwrap();

    let map = SegmentMap::load(&segment_path(dir.path(), 0), Format::default()).unwrap();
    let entry = map.get("k").unwrap();
    assert_eq!(entry.op, Op::Del);
}

#[test]
fn older_tombstone_loses_to_newer_value() {
    let dir = tempdir().unwrap();
    write_entries(dir.path(), 0, &[("k", None)]);
    write_entries(dir.path(), 1, &[("k", Some("revived"))]);

    merge_segments(dir.path(), 0, 1, Format::default()).unwrap();

    let map = SegmentMap::load(&segment_path(dir.path(), 0), Format::default()).unwrap();
    let entry = map.get("k").unwrap();
    assert_eq!(entry.op, Op::Set);
    assert_eq!(entry.value, "revived");
}

// -------------------- Ordering --------------------

#[test]
fn merged_output_is_sorted_with_interleaved_inputs() {
    let dir = tempdir().unwrap();
    write_entries(
        dir.path(),
        0,
        &[("a", Some("1")), ("e", Some("5")), ("i", Some("9"))],
    );
    write_entries(
        dir.path(),
        1,
        &[("c", Some("3")), ("e", Some("55")), ("g", Some("7"))],
    );

    merge_segments(dir.path(), 0, 1, Format::default()).unwrap();

    let recs = read_all_records(&segment_path(dir.path(), 0));
    let keys: Vec<&str> = recs.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "c", "e", "g", "i"]);

    // the tie on "e" kept the newer value
    assert_eq!(recs[2].value, "55");
}

// -------------------- Empty and uneven inputs --------------------

#[test]
fn merge_with_one_empty_input() {
    let dir = tempdir().unwrap();
    write_entries(dir.path(), 0, &[]);
    write_entries(dir.path(), 1, &[("a", Some("1")), ("b", Some("2"))]);

    merge_segments(dir.path(), 0, 1, Format::default()).unwrap();

    let dest = segment_path(dir.path(), 0);
    assert_eq!(header_count(&dest), 2);
    let map = SegmentMap::load(&dest, Format::default()).unwrap();
    assert_eq!(map.get("b").unwrap().value, "2");
}

#[test]
fn merge_drains_the_longer_input() {
    let dir = tempdir().unwrap();
    write_entries(dir.path(), 0, &[("m", Some("x"))]);
    write_entries(
        dir.path(),
        1,
        &[
            ("a", Some("1")),
            ("b", Some("2")),
            ("y", Some("3")),
            ("z", Some("4")),
        ],
    );

    merge_segments(dir.path(), 0, 1, Format::default()).unwrap();

    let recs = read_all_records(&segment_path(dir.path(), 0));
    let keys: Vec<&str> = recs.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b", "m", "y", "z"]);
}

// -------------------- Validation --------------------

#[test]
fn merge_rejects_inputs_with_wrong_version() {
    let dir = tempdir().unwrap();
    let newer = Format {
        magic: SEGMENT_MAGIC,
        version: SEGMENT_VERSION + 1,
    };
    let mut mem = Memtable::new();
    mem.set("k", "v");
    write_segment(dir.path(), 0, newer, &mem).unwrap();
    write_segment(dir.path(), 1, newer, &mem).unwrap();

    let result = merge_segments(dir.path(), 0, 1, Format::default());
    assert!(matches!(result, Err(SegmentError::BadVersion { .. })));
}
