/**
 * file: main_tests.rs
 * desc: Test the preparatory step end to end.
 */
use clap::Parser;
use std::fs;

use shared::index::{SimType, TranscriptIndex};
use shared::SimError;

use crate::cli::{CliArgs, Command, PreparatoryCommand};
use crate::run_preparatory;

static INDEX: &'static str = "\
transcript_id\tgene_id\tstructural_category\tref_gene\tref_transcript
T1\tG1\tnovel_in_catalog\tG1\tnovel
T2\tG2\tfull-splice_match\tG2\tT9
T3\tG3\tfull-splice_match\tG3\tT8
";

static GTF: &'static str = "\
chr1\tX\ttranscript\t1\t90\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
chr1\tX\texon\t1\t90\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
chr1\tX\ttranscript\t100\t190\t.\t+\t.\tgene_id \"G2\"; transcript_id \"T2\";
chr1\tX\texon\t100\t190\t.\t+\t.\tgene_id \"G2\"; transcript_id \"T2\";
";

fn preparatory(dir: &tempfile::TempDir, extra: &[&str]) -> PreparatoryCommand {
    let index = dir.path().join("x_index.tsv");
    let gtf = dir.path().join("x.gtf");

    fs::write(&index, INDEX).unwrap();
    fs::write(&gtf, GTF).unwrap();

    let out = dir.path().join("out");
    let mut argv = vec![
        "novsim".to_string(),
        "preparatory".to_string(),
        extra[0].to_string(),
        "--trans-index".to_string(),
        index.to_string_lossy().to_string(),
        "--gtf".to_string(),
        gtf.to_string_lossy().to_string(),
        "--dir".to_string(),
        out.to_string_lossy().to_string(),
        "--output".to_string(),
        "run".to_string(),
        "--nic".to_string(),
        "1".to_string(),
    ];
    argv.extend(extra[1..].iter().map(|a| a.to_string()));

    match CliArgs::parse_from(argv).command {
        Command::Preparatory(p) => p,
        _ => panic!("expected the preparatory subcommand"),
    }
}

#[test]
fn test_preparatory_equal() {
    let dir = tempfile::tempdir().unwrap();
    let args = preparatory(
        &dir,
        &["equal", "--trans-number", "2", "--read-count", "100"],
    );

    run_preparatory(&args).unwrap();

    let out = dir.path().join("out");
    let gtf = fs::read_to_string(out.join("run_modified.gtf")).unwrap();
    let index = TranscriptIndex::from_path(&out.join("run_index.tsv")).unwrap();

    assert!(!gtf.contains("\"T1\""));
    assert!(gtf.contains("\"T2\""));
    assert!(index.records[0].sim_type == Some(SimType::Novel));
    assert!(index.records[0].requested_counts == Some(50));
    assert!(index
        .records
        .iter()
        .all(|r| r.requested_counts.is_some() && r.requested_tpm.is_some()));
}

#[test]
fn test_preparatory_failed_sample_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let sam = dir.path().join("sample.sam");

    // Valid alignment file without a single aligned read
    fs::write(&sam, "@HD\tVN:1.6\tSO:unsorted\n@SQ\tSN:T1\tLN:100\n").unwrap();

    let args = preparatory(&dir, &["sample", "--sam", sam.to_str().unwrap()]);

    assert!(matches!(run_preparatory(&args), Err(SimError::Config(_))));

    let out = dir.path().join("out");

    assert!(!out.join("run_modified.gtf").exists());
    assert!(!out.join("run_index.tsv").exists());
}
