/**
 * file: cli.rs
 * desc: CLI parsing and validation.
 */
use clap::{ArgEnum, ArgGroup, Parser, Subcommand};
use std::path::{Path, PathBuf};

use shared::index::StructuralCategory;
use shared::{Result, SimError};

use crate::alignment::{self, Technology};
use crate::expression_profiles;
use crate::select::CategoryQuota;
use crate::simulators::NanoSimReadType;

/**
 * HELP DESCRIPTIONS
 */

static MODE_HELP: &'static str = "
Expression profile used to request reads per transcript.

<equal>  simulates --trans-number transcripts, all novel transcripts plus random known
         ones, splitting --read-count evenly among them
<custom> draws read counts from negative binomial distributions, one for known and
         one for novel transcripts
<sample> resamples read counts from a real PacBio or ONT sample aligned to the
         reference transcriptome
";

static TRANS_INDEX_HELP: &'static str = "
Transcript index, a TSV file with a header and at least the columns:

    transcript_id  gene_id  structural_category  ref_gene  ref_transcript

Columns are found by name, any other column is kept as is.
";

/**
 * STRUCTS
 */

/**
 * How read counts are assigned to the transcripts being simulated.
 */
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ArgEnum)]
pub enum ExpressionMode {
    // Same read count for a fixed number of transcripts
    Equal,
    // Negative binomial draws
    Custom,
    // Derived from a real sample
    Sample,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ArgEnum)]
pub enum ReadType {
    #[clap(name = "dRNA")]
    DirectRna,
    #[clap(name = "cDNA")]
    Cdna,
}

impl From<ReadType> for NanoSimReadType {
    fn from(read_type: ReadType) -> NanoSimReadType {
        match read_type {
            ReadType::DirectRna => NanoSimReadType::DirectRna,
            ReadType::Cdna => NanoSimReadType::Cdna,
        }
    }
}

#[derive(Debug, Parser)]
#[clap(group(
    ArgGroup::new("sample-reads")
    .args(&["pb-reads", "ont-reads"])
))]
pub struct PreparatoryCommand {
    #[clap(arg_enum, value_parser, help = MODE_HELP)]
    pub mode: ExpressionMode,

    #[clap(long, value_parser, help = TRANS_INDEX_HELP)]
    pub trans_index: PathBuf,

    #[clap(long, value_parser, help = "Reference annotation (GTF)")]
    pub gtf: PathBuf,

    #[clap(
        long,
        value_parser,
        help = "Prefix for output files, derived from the index filename by default"
    )]
    pub output: Option<String>,

    #[clap(long, value_parser, default_value = ".", help = "Output directory")]
    pub dir: PathBuf,

    #[clap(
        long,
        value_parser,
        default_value_t = 50000,
        help = "Number of reads to simulate (equal mode)"
    )]
    pub read_count: u64,

    #[clap(
        long,
        value_parser,
        default_value_t = 10000,
        help = "Number of different transcripts to simulate (equal and custom modes)"
    )]
    pub trans_number: usize,

    #[clap(long, value_parser, default_value_t = 15.0, help = "Known transcripts negative binomial n")]
    pub nbn_known: f64,

    #[clap(long, value_parser, default_value_t = 0.5, help = "Known transcripts negative binomial p")]
    pub nbp_known: f64,

    #[clap(long, value_parser, default_value_t = 5.0, help = "Novel transcripts negative binomial n")]
    pub nbn_novel: f64,

    #[clap(long, value_parser, default_value_t = 0.5, help = "Novel transcripts negative binomial p")]
    pub nbp_novel: f64,

    #[clap(long, value_parser, help = "Reference transcriptome (FASTA), required in sample mode")]
    pub rt: Option<PathBuf>,

    #[clap(long, value_parser, help = "Real PacBio reads (sample mode)")]
    pub pb_reads: Option<PathBuf>,

    #[clap(long, value_parser, help = "Real ONT reads (sample mode)")]
    pub ont_reads: Option<PathBuf>,

    #[clap(
        long,
        value_parser,
        help = "Alignment of the real reads to the reference transcriptome, skips alignment"
    )]
    pub sam: Option<PathBuf>,

    #[clap(
        long,
        value_parser,
        default_value_t = 0.1,
        help = "Acceptance probability for low read counts (sample mode)"
    )]
    pub low_prob: f64,

    #[clap(
        long,
        value_parser,
        default_value_t = 0.9,
        help = "Acceptance probability for high read counts (sample mode)"
    )]
    pub high_prob: f64,

    #[clap(
        long,
        value_parser,
        default_value_t = 1000,
        help = "Give up sampling read counts after N attempts per transcript (sample mode)"
    )]
    pub max_sampling_attempts: usize,

    #[clap(long, value_parser, default_value_t = 0, help = "FSM transcripts to delete")]
    pub fsm: usize,

    #[clap(long, value_parser, default_value_t = 0, help = "ISM transcripts to delete")]
    pub ism: usize,

    #[clap(long, value_parser, default_value_t = 0, help = "NIC transcripts to delete")]
    pub nic: usize,

    #[clap(long, value_parser, default_value_t = 0, help = "NNC transcripts to delete")]
    pub nnc: usize,

    #[clap(long, value_parser, default_value_t = 0, help = "Fusion transcripts to delete")]
    pub fusion: usize,

    #[clap(long, value_parser, default_value_t = 0, help = "Antisense transcripts to delete")]
    pub antisense: usize,

    #[clap(long, value_parser, default_value_t = 0, help = "Genic-intron transcripts to delete")]
    pub gi: usize,

    #[clap(long, value_parser, default_value_t = 0, help = "Genic-genomic transcripts to delete")]
    pub gg: usize,

    #[clap(long, value_parser, default_value_t = 0, help = "Intergenic transcripts to delete")]
    pub intergenic: usize,

    #[clap(long, value_parser, default_value_t = 1, help = "Number of threads for external tools")]
    pub cores: usize,

    #[clap(long, value_parser, default_value_t = 123, help = "Random seed")]
    pub seed: u64,
}

#[derive(Debug, Parser)]
#[clap(group(
    ArgGroup::new("long-reads")
    .args(&["pb", "ont"])
))]
pub struct SimCommand {
    #[clap(long, value_parser, help = "Modified reference annotation (GTF)")]
    pub gtf: PathBuf,

    #[clap(long, value_parser, help = "Reference genome (FASTA)")]
    pub genome: PathBuf,

    #[clap(long, value_parser, help = "Reference transcriptome (FASTA), required for --ont and --illumina")]
    pub rt: Option<PathBuf>,

    #[clap(long, value_parser, help = "Transcript index with requested counts")]
    pub trans_index: PathBuf,

    #[clap(
        long,
        arg_enum,
        value_parser,
        default_value = "dRNA",
        help = "ONT read type simulated by NanoSim"
    )]
    pub read_type: ReadType,

    #[clap(long, value_parser, default_value = ".", help = "Output directory")]
    pub dir: PathBuf,

    #[clap(long, value_parser, default_value_t = 1, help = "Number of threads for external tools")]
    pub cores: usize,

    #[clap(long, value_parser, default_value_t = false, help = "Simulate PacBio reads with IsoSeqSim")]
    pub pb: bool,

    #[clap(long, value_parser, default_value_t = false, help = "Simulate ONT reads with NanoSim")]
    pub ont: bool,

    #[clap(long, value_parser, default_value_t = false, help = "Simulate Illumina reads with Polyester")]
    pub illumina: bool,

    #[clap(
        long,
        value_parser,
        help = "Number of long reads to simulate [default: sum of requested counts]"
    )]
    pub long_count: Option<u64>,

    #[clap(
        long,
        value_parser,
        help = "Number of short reads to simulate [default: sum of requested counts]"
    )]
    pub short_count: Option<u64>,

    #[clap(long, value_parser, default_value_t = 123, help = "Random seed")]
    pub seed: u64,

    #[clap(
        long,
        value_parser,
        env = "NOVSIM_ISOSEQSIM",
        default_value = "simulate.py",
        help = "IsoSeqSim simulate script"
    )]
    pub isoseqsim: PathBuf,

    #[clap(
        long,
        value_parser,
        default_value = "utilities",
        help = "IsoSeqSim utilities directory with the end completeness tables"
    )]
    pub isoseqsim_utils: PathBuf,

    #[clap(
        long,
        value_parser,
        env = "NOVSIM_NANOSIM",
        default_value = "simulator.py",
        help = "NanoSim simulator script"
    )]
    pub nanosim: PathBuf,

    #[clap(
        long,
        value_parser,
        default_value = "pre-trained_models",
        help = "Directory with the NanoSim pre-trained models"
    )]
    pub nanosim_models: PathBuf,

    #[clap(long, value_parser, default_value = "Rscript", help = "Rscript executable")]
    pub rscript: PathBuf,
}

#[derive(Debug, Parser)]
pub struct ReconcileCommand {
    #[clap(long, value_parser, help = "Transcript index, updated in place")]
    pub trans_index: PathBuf,

    #[clap(
        long,
        value_parser,
        help = "Read to transcript table: read ID and transcript ID, tab separated, no header"
    )]
    pub read_to_transcript: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Select novel transcripts, modify the annotation and assign expression
    Preparatory(PreparatoryCommand),
    /// Simulate reads and count reads per transcript
    Sim(SimCommand),
    /// Fold simulated read counts into a transcript index
    Reconcile(ReconcileCommand),
}

#[derive(Debug, Parser)]
#[clap(version, about, long_about = None)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub command: Command,
}

/**
 * FUNCTIONS
 */

fn require_file(path: &Path, what: &str) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SimError::Config(format!(
            "{} ({}) does not exist",
            what,
            path.display()
        )))
    }
}

fn require_probability(value: f64, what: &str) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::Config(format!(
            "{} must be within [0, 1], got {}",
            what, value
        )))
    }
}

impl PreparatoryCommand {
    /**
     * Check the arguments before anything gets written.
     */
    pub fn validate(&self) -> Result<()> {
        require_file(&self.trans_index, "transcript index")?;
        require_file(&self.gtf, "annotation")?;

        if self.trans_number == 0 {
            return Err(SimError::Config(
                "--trans-number must be larger than zero".to_string(),
            ));
        }

        match self.mode {
            ExpressionMode::Equal => {
                // Every transcript gets read_count / trans_number reads
                if self.read_count < self.trans_number as u64 {
                    return Err(SimError::Config(format!(
                        "--read-count ({}) is smaller than --trans-number ({}), no transcript would get a read",
                        self.read_count, self.trans_number
                    )));
                }
            }
            ExpressionMode::Custom => {
                expression_profiles::NegativeBinomial::new(self.nbn_known, self.nbp_known)?;
                expression_profiles::NegativeBinomial::new(self.nbn_novel, self.nbp_novel)?;
            }
            ExpressionMode::Sample => {
                require_probability(self.low_prob, "--low-prob")?;
                require_probability(self.high_prob, "--high-prob")?;

                if self.low_prob > self.high_prob {
                    return Err(SimError::Config(format!(
                        "--low-prob ({}) is larger than --high-prob ({})",
                        self.low_prob, self.high_prob
                    )));
                }

                match (&self.sam, self.sample_reads()) {
                    (Some(sam), _) => require_file(sam, "sample alignment")?,
                    (None, Some((reads, _))) => {
                        require_file(reads, "sample reads")?;

                        match &self.rt {
                            Some(rt) => require_file(rt, "reference transcriptome")?,
                            None => {
                                return Err(SimError::Config(
                                    "sample mode needs --rt to align the sample reads".to_string(),
                                ))
                            }
                        }
                    }
                    (None, None) => {
                        return Err(SimError::Config(
                            "sample mode needs --pb-reads, --ont-reads or --sam".to_string(),
                        ))
                    }
                }
            }
        }

        Ok(())
    }

    /**
     * Real reads for sample mode and the technology that produced them.
     */
    pub fn sample_reads(&self) -> Option<(&Path, Technology)> {
        match (&self.pb_reads, &self.ont_reads) {
            (Some(pb), _) => Some((pb.as_path(), Technology::PacBio)),
            (None, Some(ont)) => Some((ont.as_path(), Technology::Nanopore)),
            (None, None) => None,
        }
    }

    pub fn quotas(&self) -> CategoryQuota {
        [
            (StructuralCategory::FullSpliceMatch, self.fsm),
            (StructuralCategory::IncompleteSpliceMatch, self.ism),
            (StructuralCategory::NovelInCatalog, self.nic),
            (StructuralCategory::NovelNotInCatalog, self.nnc),
            (StructuralCategory::Fusion, self.fusion),
            (StructuralCategory::Antisense, self.antisense),
            (StructuralCategory::Genic, self.gg),
            (StructuralCategory::GenicIntron, self.gi),
            (StructuralCategory::Intergenic, self.intergenic),
        ]
        .into_iter()
        .collect()
    }

    pub fn output_prefix(&self) -> String {
        match &self.output {
            Some(output) => output.clone(),
            None => prefix_from_index(&self.trans_index),
        }
    }
}

/**
 * Output prefix derived from an index filename by dropping its last '_' separated part,
 * e.g. sample_classification.txt -> sample.
 */
pub fn prefix_from_index(index: &Path) -> String {
    let name = index
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    match name.rsplit_once('_') {
        Some((prefix, _)) if !prefix.is_empty() => prefix.to_string(),
        _ => name
            .split('.')
            .next()
            .unwrap_or("novsim")
            .to_string(),
    }
}

impl SimCommand {
    pub fn validate(&self) -> Result<()> {
        require_file(&self.trans_index, "transcript index")?;
        require_file(&self.gtf, "annotation")?;
        require_file(&self.genome, "genome")?;

        if !(self.pb || self.ont || self.illumina) {
            return Err(SimError::Config(
                "nothing to simulate, use --pb, --ont and/or --illumina".to_string(),
            ));
        }

        if self.ont || self.illumina {
            match &self.rt {
                Some(rt) => require_file(rt, "reference transcriptome")?,
                None => {
                    return Err(SimError::Config(
                        "--ont and --illumina need a reference transcriptome (--rt)".to_string(),
                    ))
                }
            }
        }

        Ok(())
    }
}

impl ReconcileCommand {
    pub fn validate(&self) -> Result<()> {
        require_file(&self.trans_index, "transcript index")?;
        require_file(&self.read_to_transcript, "read to transcript table")
    }
}

/**
 Fill out and return an ExpressionProfile implementation using the user provided arguments.
 In sample mode this aligns the real reads (unless an alignment is given) and tallies the
 per-transcript counts, which can take a while.

 args
  args: preparatory arguments, already validated

 returns
  the expression profile
*/
pub fn determine_expression_profile(
    args: &PreparatoryCommand,
) -> Result<Box<dyn expression_profiles::ExpressionProfile>> {
    match args.mode {
        ExpressionMode::Equal => Ok(Box::new(expression_profiles::FixedExpressionProfile {
            n_trans: args.trans_number,
            read_count: args.read_count,
        })),
        ExpressionMode::Custom => Ok(Box::new(
            expression_profiles::NegativeBinomialExpressionProfile {
                n_trans: Some(args.trans_number),
                known: expression_profiles::NegativeBinomial::new(args.nbn_known, args.nbp_known)?,
                novel: expression_profiles::NegativeBinomial::new(args.nbn_novel, args.nbp_novel)?,
            },
        )),
        ExpressionMode::Sample => {
            let observed = match (&args.sam, args.sample_reads(), &args.rt) {
                (Some(sam), _, _) => alignment::observed_counts_from_sam(sam)?,
                (None, Some((reads, tech)), Some(rt)) => {
                    let sam_output = args.dir.join(format!(
                        "{}_align_{}.sam",
                        args.output_prefix(),
                        tech.label()
                    ));

                    alignment::observed_counts_from_reads(rt, reads, tech, args.cores, &sam_output)?
                }
                _ => {
                    return Err(SimError::Config(
                        "sample mode needs --rt with --pb-reads/--ont-reads, or --sam".to_string(),
                    ))
                }
            };

            Ok(Box::new(expression_profiles::SampleExpressionProfile::new(
                observed,
                args.low_prob,
                args.high_prob,
                args.max_sampling_attempts,
            )?))
        }
    }
}

pub fn parse_cli_args() -> CliArgs {
    CliArgs::parse()
}
