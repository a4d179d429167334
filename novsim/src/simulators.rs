/**
 * file: simulators.rs
 * desc: Drive the external read simulators: IsoSeqSim (PacBio), NanoSim (ONT) and Polyester
 *       (Illumina). Each simulator gets its expression input from the transcript index and, for
 *       long reads, reports which transcript every simulated read came from.
 */
use needletail::parse_fastx_file;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

use shared::index::TranscriptIndex;
use shared::util;
use shared::{Result, SimError};

use crate::external;
use crate::files::{self, ReadOrigin};
use crate::gtf;

/**
 * STRUCTS
 */

/**
 * An input file written for a simulator and the number of reads to simulate from it.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationInput {
    pub path: PathBuf,
    pub read_count: u64,
}

/**
 * NanoSim read type, selects the pre-trained model.
 */
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NanoSimReadType {
    DirectRna,
    Cdna,
}

impl NanoSimReadType {
    pub fn model_name(&self) -> &'static str {
        match self {
            NanoSimReadType::DirectRna => "human_NA12878_dRNA_Bham1_guppy",
            NanoSimReadType::Cdna => "human_NA12878_cDNA_Bham1_guppy",
        }
    }

    // Value for NanoSim's -r option
    pub fn read_type(&self) -> &'static str {
        match self {
            NanoSimReadType::DirectRna => "dRNA",
            NanoSimReadType::Cdna => "cDNA_1D2",
        }
    }

    pub fn uracil(&self) -> bool {
        *self == NanoSimReadType::DirectRna
    }
}

pub trait ReadSimulator {
    // Tool name used in logs and errors
    fn name(&self) -> &'static str;
    // Write the simulator's expression input from the transcript index
    fn write_input(&self, index: &TranscriptIndex) -> Result<SimulationInput>;
    // Build the simulator command for the given input
    fn command(&self, input: &SimulationInput) -> Result<Command>;
    // The transcript of origin of every simulated read, None if the simulator doesn't track it
    fn read_origins(&self) -> Result<Option<Vec<ReadOrigin>>>;
}

/**
 * Extract the transcript ID from a simulated read name, the first '_' separated token.
 */
pub fn transcript_from_read_name(name: &str) -> &str {
    name.split_whitespace()
        .next()
        .unwrap_or("")
        .split('_')
        .next()
        .unwrap_or("")
}

/**
 * Chooses the requested read count: an explicit count wins over the sum of requested counts.
 */
fn read_count(explicit: Option<u64>, requested: u64) -> u64 {
    explicit.unwrap_or(requested)
}

/**
 Run a simulator end to end: write its input, run it, remove the input and collect read origins.

 args
  simulator: the simulator to run
  index:     transcript index with requested counts

 returns
  read origins if the simulator reports them
*/
pub fn simulate<T: ReadSimulator + ?Sized>(
    simulator: &T,
    index: &TranscriptIndex,
) -> Result<Option<Vec<ReadOrigin>>> {
    let input = simulator.write_input(index)?;

    info!(
        "Simulating {} reads with {}",
        input.read_count,
        simulator.name()
    );

    external::run(simulator.name(), &mut simulator.command(&input)?)?;
    fs::remove_file(&input.path)?;

    info!("{} simulation done", simulator.name());

    simulator.read_origins()
}

/**
 * IsoSeqSim
 */

pub struct IsoSeqSim {
    pub executable: PathBuf,
    // Directory with the 5'/3' end completeness tables
    pub utilities: PathBuf,
    pub genome: PathBuf,
    pub gtf: PathBuf,
    pub output_dir: PathBuf,
    pub read_count: Option<u64>,
    pub cores: usize,
}

impl IsoSeqSim {
    fn reads_path(&self) -> PathBuf {
        self.output_dir.join("PacBio_simulated.fasta")
    }
}

impl ReadSimulator for IsoSeqSim {
    fn name(&self) -> &'static str {
        "IsoSeqSim"
    }

    fn write_input(&self, index: &TranscriptIndex) -> Result<SimulationInput> {
        let path = self.output_dir.join("tmp_expression_pb.tsv");
        let total = files::write_expression_file(index, &path)?;

        Ok(SimulationInput {
            path,
            read_count: read_count(self.read_count, total),
        })
    }

    fn command(&self, input: &SimulationInput) -> Result<Command> {
        let mut command = Command::new(&self.executable);

        command
            .arg("-g")
            .arg(&self.genome)
            .arg("-a")
            .arg(&self.gtf)
            .arg("--expr")
            .arg(&input.path)
            .arg("--c5")
            .arg(
                self.utilities
                    .join("5_end_completeness.PacBio-Sequel.tab"),
            )
            .arg("--c3")
            .arg(
                self.utilities
                    .join("3_end_completeness.PacBio-Sequel.tab"),
            )
            .arg("-o")
            .arg(self.output_dir.join("PacBio_simulated"))
            .arg("-t")
            .arg(self.output_dir.join("PacBio_simulated.tsv"))
            // Substitution, deletion and insertion rates of Sequel reads
            .args(["--es", "0.01731", "--ed", "0.01090", "--ei", "0.02204"])
            .arg("-n")
            .arg(input.read_count.to_string())
            .args(["-m", "normal"])
            .arg("--cpu")
            .arg(self.cores.to_string())
            .arg("--tempdir")
            .arg(self.output_dir.join("temp_isoseqsim"));

        Ok(command)
    }

    fn read_origins(&self) -> Result<Option<Vec<ReadOrigin>>> {
        let path = self.reads_path();
        let mut reader = parse_fastx_file(&path).map_err(|e| SimError::Alignment {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut origins = Vec::new();

        while let Some(record) = reader.next() {
            let record = record.map_err(|e| SimError::Alignment {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            let read_id = util::bytes_to_string(record.id());

            origins.push(ReadOrigin {
                transcript_id: transcript_from_read_name(&read_id).to_string(),
                read_id,
            });
        }

        Ok(Some(origins))
    }
}

/**
 * NanoSim
 */

pub struct NanoSim {
    pub executable: PathBuf,
    // Directory holding the pre-trained models, either unpacked or as <model>.tar.gz
    pub models: PathBuf,
    pub reference_transcriptome: PathBuf,
    pub genome: PathBuf,
    pub gtf: PathBuf,
    pub output_dir: PathBuf,
    pub read_type: NanoSimReadType,
    pub read_count: Option<u64>,
    pub cores: usize,
}

impl NanoSim {
    /**
     * Directory of the pre-trained model, unpacking the model archive on first use.
     */
    fn model_dir(&self) -> Result<PathBuf> {
        let model = self.read_type.model_name();
        let model_dir = self.models.join(model);

        if !model_dir.exists() {
            info!("Unpacking NanoSim model {}", model);

            let mut command = Command::new("tar");
            command
                .arg("-xzf")
                .arg(format!("{}.tar.gz", model))
                .current_dir(&self.models);

            external::run("tar", &mut command)?;
        }

        Ok(model_dir)
    }

    /**
     Merge the aligned and unaligned simulated reads into a single FASTQ, renaming each read
     after its transcript of origin. NanoSim drops transcript versions from read names, these
     are restored using the annotation.
    */
    fn merge_reads(&self) -> Result<Vec<ReadOrigin>> {
        let versions = gtf::transcript_versions(&self.gtf)?;
        let mut output = BufWriter::new(File::create(
            self.output_dir.join("ONT_simulated.fastq"),
        )?);
        let mut origins = Vec::new();
        let mut unannotated: BTreeSet<String> = BTreeSet::new();

        for name in [
            "ONT_simulated_aligned_reads.fastq",
            "ONT_simulated_unaligned_reads.fastq",
        ] {
            let path = self.output_dir.join(name);

            if !path.exists() {
                warn!("{} was not produced by NanoSim", path.display());
                continue;
            }

            let mut reader = parse_fastx_file(&path).map_err(|e| SimError::Alignment {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

            while let Some(record) = reader.next() {
                let record = record.map_err(|e| SimError::Alignment {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
                let name = util::bytes_to_string(record.id());
                let short = transcript_from_read_name(&name);

                let unversioned = short.split('.').next().unwrap_or(short);

                let transcript_id = match versions.get(unversioned) {
                    Some(full) => full.clone(),
                    None => {
                        unannotated.insert(short.to_string());
                        short.to_string()
                    }
                };
                let read_id = format!(
                    "{}_ONT_simulated_read_{}",
                    transcript_id,
                    origins.len()
                );

                write_fastq_record(
                    &mut output,
                    &read_id,
                    &record.seq(),
                    record.qual().unwrap_or(&[]),
                )?;

                origins.push(ReadOrigin {
                    read_id,
                    transcript_id,
                });
            }
        }

        output.flush()?;

        for tid in unannotated.iter() {
            warn!("{} was not found in the annotation", tid);
        }

        Ok(origins)
    }
}

fn write_fastq_record<W: Write>(
    writer: &mut W,
    read_id: &str,
    sequence: &[u8],
    quality: &[u8],
) -> Result<()> {
    writeln!(writer, "@{}", read_id)?;
    writer.write_all(sequence)?;
    writer.write_all(b"\n+\n")?;
    writer.write_all(quality)?;
    writer.write_all(b"\n")?;

    Ok(())
}

impl ReadSimulator for NanoSim {
    fn name(&self) -> &'static str {
        "NanoSim"
    }

    fn write_input(&self, index: &TranscriptIndex) -> Result<SimulationInput> {
        let path = self.output_dir.join("tmp_expression_ont.tsv");
        let total = files::write_expression_file(index, &path)?;

        Ok(SimulationInput {
            path,
            read_count: read_count(self.read_count, total),
        })
    }

    fn command(&self, input: &SimulationInput) -> Result<Command> {
        let model_dir = self.model_dir()?;
        let mut command = Command::new(&self.executable);

        command
            .arg("transcriptome")
            .arg("-rt")
            .arg(&self.reference_transcriptome)
            .arg("-rg")
            .arg(&self.genome)
            .arg("-e")
            .arg(&input.path)
            .arg("-c")
            .arg(model_dir.join("training"))
            .arg("-o")
            .arg(self.output_dir.join("ONT_simulated"))
            .arg("-n")
            .arg(input.read_count.to_string())
            .args(["-r", self.read_type.read_type(), "-b", "guppy"])
            .arg("-t")
            .arg(self.cores.to_string())
            .arg("--fastq");

        if self.read_type.uracil() {
            command.arg("--uracil");
        }

        Ok(command)
    }

    fn read_origins(&self) -> Result<Option<Vec<ReadOrigin>>> {
        Ok(Some(self.merge_reads()?))
    }
}

/**
 * Polyester
 */

pub struct Polyester {
    pub rscript: PathBuf,
    pub reference_transcriptome: PathBuf,
    pub output_dir: PathBuf,
    pub read_count: Option<u64>,
    pub seed: u64,
}

// Quote a path for use inside an R string literal
fn r_string(path: &Path) -> String {
    format!(
        "\"{}\"",
        path.display()
            .to_string()
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
    )
}

impl Polyester {
    /**
     * R script simulating paired-end reads from a per-transcript count matrix. Counts are matched
     * to the transcriptome FASTA by the first word of each sequence name.
     */
    fn script(&self, input: &SimulationInput, explicit_count: bool) -> String {
        let mut script = vec![
            "suppressMessages(library(polyester))".to_string(),
            "suppressMessages(library(Biostrings))".to_string(),
            format!(
                "fasta <- readDNAStringSet({})",
                r_string(&self.reference_transcriptome)
            ),
            "ids <- sapply(strsplit(names(fasta), \" \"), `[`, 1)".to_string(),
            format!(
                "counts <- read.table({}, header=TRUE, sep=\"\\t\", stringsAsFactors=FALSE)",
                r_string(&input.path)
            ),
            "readmat <- matrix(0, nrow=length(ids), ncol=1)".to_string(),
            "m <- match(counts$transcript_id, ids)".to_string(),
            "readmat[m[!is.na(m)], 1] <- counts$count[!is.na(m)]".to_string(),
        ];

        if explicit_count {
            script.push(format!(
                "readmat <- round(readmat * {} / sum(readmat))",
                input.read_count
            ));
        }

        script.push(format!(
            "simulate_experiment_countmat({}, readmat=readmat, outdir={}, paired=TRUE, seed={})",
            r_string(&self.reference_transcriptome),
            r_string(&self.output_dir.join("Illumina_simulated")),
            self.seed
        ));

        script.join("\n")
    }
}

impl ReadSimulator for Polyester {
    fn name(&self) -> &'static str {
        "Polyester"
    }

    fn write_input(&self, index: &TranscriptIndex) -> Result<SimulationInput> {
        let path = self.output_dir.join("tmp_counts_illumina.tsv");
        let total = files::write_count_file(index, &path)?;

        Ok(SimulationInput {
            path,
            read_count: read_count(self.read_count, total),
        })
    }

    fn command(&self, input: &SimulationInput) -> Result<Command> {
        let mut command = Command::new(&self.rscript);
        command
            .arg("-e")
            .arg(self.script(input, self.read_count.is_some()));

        Ok(command)
    }

    fn read_origins(&self) -> Result<Option<Vec<ReadOrigin>>> {
        Ok(None)
    }
}

#[cfg(test)]
#[path = "tests/simulator_tests.rs"]
mod simulator_tests;
