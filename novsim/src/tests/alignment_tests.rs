/**
 * file: alignment_tests.rs
 * desc: Test tallying of sample alignments.
 */
use std::io::Write;

use crate::alignment::{count_primary_alignments, observed_counts_from_sam, Technology};

static SAM: &'static str = "\
@HD\tVN:1.6\tSO:unsorted
@SQ\tSN:T1\tLN:100
@SQ\tSN:T2\tLN:100
@SQ\tSN:T3\tLN:100
r1\t0\tT1\t1\t60\t4M\t*\t0\t0\tACGT\tIIII
r2\t0\tT1\t5\t60\t4M\t*\t0\t0\tACGT\tIIII
r3\t16\tT2\t1\t60\t4M\t*\t0\t0\tACGT\tIIII
r4\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\tIIII
r5\t256\tT2\t1\t60\t4M\t*\t0\t0\tACGT\tIIII
r6\t2048\tT3\t1\t60\t4M\t*\t0\t0\tACGT\tIIII
";

fn write_sam(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("sample.sam");

    std::fs::File::create(&path)
        .unwrap()
        .write_all(SAM.as_bytes())
        .unwrap();

    path
}

#[test]
fn test_count_primary_alignments() {
    let dir = tempfile::tempdir().unwrap();
    let counts = count_primary_alignments(&write_sam(&dir)).unwrap();

    assert!(counts.len() == 2);
    assert!(counts["T1"] == 2);
    assert!(counts["T2"] == 1);
    // Only a supplementary alignment
    assert!(counts.get("T3").is_none());
}

#[test]
fn test_observed_counts_from_sam() {
    let dir = tempfile::tempdir().unwrap();

    assert!(observed_counts_from_sam(&write_sam(&dir)).unwrap() == vec![2, 1]);
}

#[test]
fn test_missing_sam() {
    let dir = tempfile::tempdir().unwrap();

    assert!(count_primary_alignments(&dir.path().join("missing.sam")).is_err());
}

#[test]
fn test_technology() {
    assert!(Technology::PacBio.minimap2_preset() == "map-pb");
    assert!(Technology::Nanopore.minimap2_preset() == "map-ont");
    assert!(Technology::PacBio.label() == "pb");
    assert!(Technology::Nanopore.label() == "ont");
}
