/**
 * file: main.rs
 * desc: it's the main
 */
mod alignment;
mod cli;
mod expression_profiles;
mod external;
mod files;
mod gtf;
mod log;
mod reconcile;
mod select;
mod simulators;
mod summary;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::Path;
use tracing::{error, info, Level};

use shared::index::TranscriptIndex;
use shared::{Result, SimError};

use crate::files::ReadOrigin;
use crate::summary::RunSummary;

/**
 * Select novel transcripts, write the modified annotation and the index, then assign expression.
 */
fn run_preparatory(args: &cli::PreparatoryCommand) -> Result<()> {
    args.validate()?;

    fs::create_dir_all(&args.dir)?;

    // Sample mode aligns reads here, any failure must come before outputs are written
    let profile = cli::determine_expression_profile(args)?;
    let prefix = args.output_prefix();
    let mut summary = RunSummary::new();

    info!("Loading transcript index {}", args.trans_index.display());

    let mut index = TranscriptIndex::from_path(&args.trans_index)?;
    let requested = args.quotas();
    let mut remaining = requested.clone();

    info!("Selecting transcripts to delete");

    let targets = select::select_targets(&mut index, &mut remaining, args.seed);
    summary.record_deletions(&requested, &targets);

    let gtf_output = args.dir.join(format!("{}_modified.gtf", prefix));

    info!("Writing modified annotation to {}", gtf_output.display());

    let stats = gtf::write_modified_gtf(&args.gtf, &gtf_output, &targets.deletion_ids())?;

    info!(
        "Kept {} annotation lines, removed {}",
        stats.kept, stats.dropped
    );

    let index_output = args.dir.join(format!("{}_index.tsv", prefix));
    index.write_to_path(&index_output)?;

    info!("Assigning expression");

    let mut rng = StdRng::seed_from_u64(args.seed);

    summary.extend_notes(expression_profiles::assign_expression(
        &mut index,
        &profile,
        &mut rng,
    )?);

    index.update_in_place(&index_output)?;

    info!("Transcript index written to {}", index_output.display());

    summary.log();

    Ok(())
}

/**
 * Save the read origins of a long-read simulation and fold the realized counts into the index.
 */
fn record_read_origins(
    index: &mut TranscriptIndex,
    origins: &[ReadOrigin],
    output: &Path,
    summary: &mut RunSummary,
) -> Result<()> {
    info!("Writing read to transcript table {}", output.display());

    files::write_read_origins(origins, output)?;

    let report = reconcile::reconcile(index, origins);
    summary.extend_notes(report.notes());

    Ok(())
}

/**
 * Run the requested simulators, then update the index with the simulated counts.
 */
fn run_sim(args: &cli::SimCommand) -> Result<()> {
    args.validate()?;

    fs::create_dir_all(&args.dir)?;

    let mut index = TranscriptIndex::from_path(&args.trans_index)?;
    let mut summary = RunSummary::new();

    if !index.has_expression() {
        return Err(SimError::Config(format!(
            "{} has no requested counts, run the preparatory step first",
            args.trans_index.display()
        )));
    }

    if args.pb {
        let isoseqsim = simulators::IsoSeqSim {
            executable: args.isoseqsim.clone(),
            utilities: args.isoseqsim_utils.clone(),
            genome: args.genome.clone(),
            gtf: args.gtf.clone(),
            output_dir: args.dir.clone(),
            read_count: args.long_count,
            cores: args.cores,
        };

        if let Some(origins) = simulators::simulate(&isoseqsim, &index)? {
            record_read_origins(
                &mut index,
                &origins,
                &args.dir.join("PacBio_simulated.read_to_isoform.tsv"),
                &mut summary,
            )?;
        }
    }

    if args.ont {
        let nanosim = simulators::NanoSim {
            executable: args.nanosim.clone(),
            models: args.nanosim_models.clone(),
            // validate() ensures --rt is present for ONT
            reference_transcriptome: args.rt.clone().unwrap_or_default(),
            genome: args.genome.clone(),
            gtf: args.gtf.clone(),
            output_dir: args.dir.clone(),
            read_type: args.read_type.into(),
            read_count: args.long_count,
            cores: args.cores,
        };

        if let Some(origins) = simulators::simulate(&nanosim, &index)? {
            record_read_origins(
                &mut index,
                &origins,
                &args.dir.join("ONT_simulated.read_to_isoform.tsv"),
                &mut summary,
            )?;
        }
    }

    if args.pb || args.ont {
        index.update_in_place(&args.trans_index)?;

        info!("Simulated counts written to {}", args.trans_index.display());
    }

    if args.illumina {
        let polyester = simulators::Polyester {
            rscript: args.rscript.clone(),
            reference_transcriptome: args.rt.clone().unwrap_or_default(),
            output_dir: args.dir.clone(),
            read_count: args.short_count,
            seed: args.seed,
        };

        simulators::simulate(&polyester, &index)?;
    }

    summary.log();

    Ok(())
}

fn run_reconcile(args: &cli::ReconcileCommand) -> Result<()> {
    args.validate()?;

    let mut index = TranscriptIndex::from_path(&args.trans_index)?;
    let origins = files::read_read_origins(&args.read_to_transcript)?;
    let mut summary = RunSummary::new();

    let report = reconcile::reconcile(&mut index, &origins);
    summary.extend_notes(report.notes());

    index.update_in_place(&args.trans_index)?;
    summary.log();

    Ok(())
}

fn run_main() -> Result<()> {
    let args = cli::parse_cli_args();

    // Set up logging
    log::setup_logging(Level::INFO);

    match &args.command {
        cli::Command::Preparatory(cmd) => run_preparatory(cmd),
        cli::Command::Sim(cmd) => run_sim(cmd),
        cli::Command::Reconcile(cmd) => run_reconcile(cmd),
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod main_tests;

fn main() {
    if let Err(e) = run_main() {
        error!("{}", e);
        std::process::exit(1);
    }
}
