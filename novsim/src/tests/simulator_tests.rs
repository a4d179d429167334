/**
 * file: simulator_tests.rs
 * desc: Test the simulator drivers without running the simulators.
 */
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use shared::index::{SimType, StructuralCategory, TranscriptIndex, TranscriptRecord};

use crate::simulators::{
    transcript_from_read_name, IsoSeqSim, NanoSim, NanoSimReadType, Polyester, ReadSimulator,
    SimulationInput,
};

fn index_with_counts() -> TranscriptIndex {
    TranscriptIndex::new(
        [("T1.2", 30), ("T2.1", 0), ("T3.1", 10)]
            .iter()
            .map(|(t, c)| {
                let mut r = TranscriptRecord::new(
                    t,
                    "G1",
                    StructuralCategory::FullSpliceMatch,
                    "G1",
                    "R1",
                );
                r.sim_type = Some(SimType::Known);
                r.requested_counts = Some(*c);
                r.requested_tpm = Some(*c as f64 * 25000.0);
                r
            })
            .collect(),
    )
}

fn args(command: &std::process::Command) -> Vec<String> {
    command
        .get_args()
        .map(|a| a.to_string_lossy().to_string())
        .collect()
}

fn isoseqsim(dir: &Path, read_count: Option<u64>) -> IsoSeqSim {
    IsoSeqSim {
        executable: PathBuf::from("simulate.py"),
        utilities: PathBuf::from("utilities"),
        genome: PathBuf::from("genome.fa"),
        gtf: PathBuf::from("ann.gtf"),
        output_dir: dir.to_path_buf(),
        read_count,
        cores: 4,
    }
}

fn nanosim(dir: &Path, models: &Path, read_type: NanoSimReadType) -> NanoSim {
    NanoSim {
        executable: PathBuf::from("simulator.py"),
        models: models.to_path_buf(),
        reference_transcriptome: PathBuf::from("rt.fa"),
        genome: PathBuf::from("genome.fa"),
        gtf: dir.join("ann.gtf"),
        output_dir: dir.to_path_buf(),
        read_type,
        read_count: None,
        cores: 2,
    }
}

#[test]
fn test_transcript_from_read_name() {
    assert!(transcript_from_read_name("ENST0001.2_PacBio_simulated_read_5") == "ENST0001.2");
    assert!(transcript_from_read_name("ENST0002_128_aligned_0_F_0_900_0 extra") == "ENST0002");
    assert!(transcript_from_read_name("T1") == "T1");
    assert!(transcript_from_read_name("") == "");
}

#[test]
fn test_nanosim_read_type() {
    assert!(NanoSimReadType::DirectRna.read_type() == "dRNA");
    assert!(NanoSimReadType::Cdna.read_type() == "cDNA_1D2");
    assert!(NanoSimReadType::DirectRna.model_name() == "human_NA12878_dRNA_Bham1_guppy");
    assert!(NanoSimReadType::Cdna.model_name() == "human_NA12878_cDNA_Bham1_guppy");
    assert!(NanoSimReadType::DirectRna.uracil());
    assert!(!NanoSimReadType::Cdna.uracil());
}

#[test]
fn test_isoseqsim_input_and_command() {
    let dir = tempfile::tempdir().unwrap();
    let sim = isoseqsim(dir.path(), None);

    let input = sim.write_input(&index_with_counts()).unwrap();
    let text = fs::read_to_string(&input.path).unwrap();

    assert!(input.read_count == 40);
    assert!(text == "target_id\test_counts\ttpm\nT1.2\t30\t750000\nT3.1\t10\t250000\n");

    let command = sim.command(&input).unwrap();
    let args = args(&command);
    let position = |flag: &str| args.iter().position(|a| a == flag).unwrap();

    assert!(command.get_program() == OsStr::new("simulate.py"));
    assert!(args[position("-n") + 1] == "40");
    assert!(args[position("--cpu") + 1] == "4");
    assert!(args[position("--es") + 1] == "0.01731");
    assert!(args[position("-m") + 1] == "normal");
    assert!(args[position("--c5") + 1].ends_with("5_end_completeness.PacBio-Sequel.tab"));
    assert!(args[position("--expr") + 1] == input.path.to_string_lossy());
}

#[test]
fn test_long_count_overrides_requested() {
    let dir = tempfile::tempdir().unwrap();
    let sim = isoseqsim(dir.path(), Some(1000));

    assert!(sim.write_input(&index_with_counts()).unwrap().read_count == 1000);
}

#[test]
fn test_isoseqsim_read_origins() {
    let dir = tempfile::tempdir().unwrap();
    let sim = isoseqsim(dir.path(), None);

    fs::write(
        dir.path().join("PacBio_simulated.fasta"),
        ">T1.2_PacBio_simulated_read_0\nACGT\n>T3.1_PacBio_simulated_read_1\nGGCC\n>T1.2_PacBio_simulated_read_2\nTTAA\n",
    )
    .unwrap();

    let origins = sim.read_origins().unwrap().unwrap();

    assert!(origins.len() == 3);
    assert!(origins[0].read_id == "T1.2_PacBio_simulated_read_0");
    assert!(origins[0].transcript_id == "T1.2");
    assert!(origins[1].transcript_id == "T3.1");
}

#[test]
fn test_nanosim_command() {
    let dir = tempfile::tempdir().unwrap();
    let models = dir.path().join("models");
    fs::create_dir_all(models.join("human_NA12878_dRNA_Bham1_guppy")).unwrap();

    let sim = nanosim(dir.path(), &models, NanoSimReadType::DirectRna);
    let input = SimulationInput {
        path: dir.path().join("expr.tsv"),
        read_count: 25,
    };
    let args = args(&sim.command(&input).unwrap());

    assert!(args[0] == "transcriptome");
    assert!(args.iter().any(|a| a == "--uracil"));
    assert!(args.iter().any(|a| a == "--fastq"));
    assert!(args.windows(2).any(|w| w[0] == "-r" && w[1] == "dRNA"));
    assert!(args.windows(2).any(|w| w[0] == "-n" && w[1] == "25"));
    assert!(args
        .windows(2)
        .any(|w| w[0] == "-c" && w[1].ends_with("training")));

    // cDNA doesn't use uracil
    fs::create_dir_all(models.join("human_NA12878_cDNA_Bham1_guppy")).unwrap();
    let sim = nanosim(dir.path(), &models, NanoSimReadType::Cdna);
    let args = self::args(&sim.command(&input).unwrap());

    assert!(!args.iter().any(|a| a == "--uracil"));
    assert!(args.windows(2).any(|w| w[0] == "-r" && w[1] == "cDNA_1D2"));
}

#[test]
fn test_nanosim_merge_reads() {
    let dir = tempfile::tempdir().unwrap();

    fs::write(
        dir.path().join("ann.gtf"),
        "chr1\tX\texon\t1\t10\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1.2\";\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("ONT_simulated_aligned_reads.fastq"),
        "@T1_1_aligned_0_F_0_4_0\nACGT\n+\nIIII\n@T1_2_aligned_1_F_0_4_0\nACGA\n+\nIIIH\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("ONT_simulated_unaligned_reads.fastq"),
        "@T9_3_unaligned_2_R_0_4_0\nTTTT\n+\nHHHH\n",
    )
    .unwrap();

    let sim = nanosim(dir.path(), dir.path(), NanoSimReadType::DirectRna);
    let origins = sim.read_origins().unwrap().unwrap();

    assert!(origins.len() == 3);
    assert!(origins[0].transcript_id == "T1.2");
    assert!(origins[0].read_id == "T1.2_ONT_simulated_read_0");
    assert!(origins[1].read_id == "T1.2_ONT_simulated_read_1");
    // Not in the annotation, kept as is
    assert!(origins[2].transcript_id == "T9");
    assert!(origins[2].read_id == "T9_ONT_simulated_read_2");

    let merged = fs::read_to_string(dir.path().join("ONT_simulated.fastq")).unwrap();

    assert!(
        merged
            == "@T1.2_ONT_simulated_read_0\nACGT\n+\nIIII\n\
                @T1.2_ONT_simulated_read_1\nACGA\n+\nIIIH\n\
                @T9_ONT_simulated_read_2\nTTTT\n+\nHHHH\n"
    );
}

#[test]
fn test_polyester() {
    let dir = tempfile::tempdir().unwrap();
    let sim = Polyester {
        rscript: PathBuf::from("Rscript"),
        reference_transcriptome: PathBuf::from("/data/rt \"v2\".fa"),
        output_dir: dir.path().to_path_buf(),
        read_count: None,
        seed: 7,
    };

    let input = sim.write_input(&index_with_counts()).unwrap();

    assert!(input.read_count == 40);
    assert!(
        fs::read_to_string(&input.path).unwrap() == "transcript_id\tcount\nT1.2\t30\nT3.1\t10\n"
    );

    let args = args(&sim.command(&input).unwrap());
    let script = &args[1];

    assert!(args[0] == "-e");
    assert!(script.contains("readDNAStringSet(\"/data/rt \\\"v2\\\".fa\")"));
    assert!(script.contains("seed=7"));
    assert!(!script.contains("sum(readmat)"));
    assert!(sim.read_origins().unwrap().is_none());

    let scaled = Polyester {
        read_count: Some(100),
        ..sim
    };
    let input = SimulationInput {
        read_count: 100,
        ..input
    };
    let args = self::args(&scaled.command(&input).unwrap());

    assert!(args[1].contains("readmat * 100 / sum(readmat)"));
}
