/**
 * file: gtf_tests.rs
 * desc: Test annotation parsing and filtering.
 */
use std::collections::BTreeSet;
use std::io::Write;

use crate::gtf::{
    attribute, filter_annotation, gene_id, transcript_id, transcript_versions, write_modified_gtf,
    FilterStats,
};

static GTF: &'static str = "\
##description: test annotation
chr1\tHAVANA\tgene\t100\t900\t.\t+\t.\tgene_id \"G1.1\"; gene_name \"ABC\";
chr1\tHAVANA\ttranscript\t100\t900\t.\t+\t.\tgene_id \"G1.1\"; transcript_id \"T1.2\";
chr1\tHAVANA\texon\t100\t300\t.\t+\t.\tgene_id \"G1.1\"; transcript_id \"T1.2\"; exon_number 1;
chr1\tHAVANA\ttranscript\t100\t800\t.\t+\t.\tgene_id \"G1.1\"; transcript_id \"T2.1\";
chr1\tHAVANA\texon\t100\t300\t.\t+\t.\tgene_id \"G1.1\"; transcript_id \"T2.1\"; exon_number 1;
chr2\tHAVANA\tgene\t100\t900\t.\t-\t.\tgene_id \"G2.4\";
chr2\tHAVANA\ttranscript\t100\t900\t.\t-\t.\tgene_id \"G2.4\"; transcript_id \"T3.1\";
chr2\tHAVANA\texon\t100\t900\t.\t-\t.\tgene_id \"G2.4\"; transcript_id \"T3.1\";
";

fn ids(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn filter(deleted: &[&str]) -> (String, FilterStats) {
    let mut output = Vec::new();
    let stats = filter_annotation(GTF.as_bytes(), &mut output, &ids(deleted)).unwrap();

    (String::from_utf8(output).unwrap(), stats)
}

#[test]
fn test_attribute() {
    let line = GTF.lines().nth(3).unwrap();

    assert!(gene_id(line) == Some("G1.1"));
    assert!(transcript_id(line) == Some("T1.2"));
    assert!(attribute(line, "exon_number") == Some("1"));
    assert!(attribute(line, "gene_name").is_none());
    assert!(transcript_id(GTF.lines().nth(1).unwrap()).is_none());
}

#[test]
fn test_filter_transcript() {
    let (text, stats) = filter(&["T1.2"]);

    assert!(stats.dropped == 2);
    assert!(stats.kept == 7);
    assert!(!text.contains("T1.2"));
    assert!(text.contains("T2.1"));
    // The gene line stays, its other isoform remains
    assert!(text.lines().nth(1).unwrap().contains("\tgene\t"));
    assert!(text.starts_with("##description"));
}

#[test]
fn test_filter_whole_gene() {
    let (text, stats) = filter(&["T3.1", "G2.4"]);

    assert!(stats.dropped == 3);
    assert!(!text.contains("chr2"));
}

#[test]
fn test_filter_keeps_lines_verbatim() {
    let (text, stats) = filter(&[]);

    assert!(stats.dropped == 0);
    assert!(text == GTF);
}

#[test]
fn test_write_modified_gtf() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.gtf");
    let output = dir.path().join("out.gtf");

    std::fs::File::create(&input)
        .unwrap()
        .write_all(GTF.as_bytes())
        .unwrap();

    let stats = write_modified_gtf(&input, &output, &ids(&["T2.1"])).unwrap();
    let text = std::fs::read_to_string(&output).unwrap();

    assert!(stats.dropped == 2);
    assert!(!text.contains("T2.1"));
    assert!(text.lines().count() == 7);
}

#[test]
fn test_transcript_versions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ann.gtf");

    std::fs::write(&path, GTF).unwrap();

    let versions = transcript_versions(&path).unwrap();

    assert!(versions.len() == 3);
    assert!(versions["T1"] == "T1.2");
    assert!(versions["T3"] == "T3.1");
    assert!(versions.get("G1").is_none());
}
