/**
 * file: alignment.rs
 * desc: Quantify a real long-read sample. Reads are aligned to the reference transcriptome with
 *       minimap2 and primary alignments are tallied per transcript.
 */
use noodles::sam;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::Command;
use tracing::info;

use shared::{Result, SimError};

use crate::external;

/**
 * STRUCTS
 */

/**
 * Sequencing technology of the real sample, selects the minimap2 preset.
 */
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Technology {
    PacBio,
    Nanopore,
}

impl Technology {
    pub fn label(&self) -> &'static str {
        match self {
            Technology::PacBio => "pb",
            Technology::Nanopore => "ont",
        }
    }

    pub fn minimap2_preset(&self) -> &'static str {
        match self {
            Technology::PacBio => "map-pb",
            Technology::Nanopore => "map-ont",
        }
    }
}

/**
 * FUNCTIONS
 */

/**
 * Align reads against the reference transcriptome, writing a SAM file without secondary
 * alignments.
 */
pub fn align_reads(
    reference: &Path,
    reads: &Path,
    technology: Technology,
    cores: usize,
    output: &Path,
) -> Result<()> {
    let mut command = Command::new("minimap2");
    command
        .arg(reference)
        .arg(reads)
        .args(["-x", technology.minimap2_preset(), "-a", "--secondary=no"])
        .arg("-t")
        .arg(cores.to_string())
        .arg("-o")
        .arg(output);

    external::run("minimap2", &mut command)
}

/**
 Count primary alignments per reference transcript. Unmapped, secondary and supplementary
 records are skipped.

 args
  sam_path: alignments in SAM format

 returns
  transcript ID -> number of reads aligned to it
*/
pub fn count_primary_alignments(sam_path: &Path) -> Result<BTreeMap<String, u64>> {
    let alignment_error = |message: String| SimError::Alignment {
        path: sam_path.display().to_string(),
        message,
    };

    let mut reader = File::open(sam_path)
        .map(BufReader::new)
        .map(sam::Reader::new)?;
    let header = reader
        .read_header()
        .map_err(|e| alignment_error(e.to_string()))?;

    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    // Keep track of what got skipped so users know what the distribution is based on
    let mut unmapped = 0;
    let mut not_primary = 0;

    for result in reader.records(&header) {
        let record = result.map_err(|e| alignment_error(e.to_string()))?;
        let flags = record.flags();

        if flags.is_unmapped() {
            unmapped += 1;
            continue;
        }

        if flags.is_secondary() || flags.is_supplementary() {
            not_primary += 1;
            continue;
        }

        let id = match record.reference_sequence_id() {
            Some(id) => id,
            None => {
                unmapped += 1;
                continue;
            }
        };

        let name = match header.reference_sequences().get_index(id) {
            Some((name, _)) => name.to_string(),
            None => {
                return Err(alignment_error(format!(
                    "reference sequence {} is not in the header",
                    id
                )))
            }
        };

        *counts.entry(name).or_default() += 1;
    }

    info!(
        "Tallied primary alignments for {} transcripts",
        counts.len()
    );
    info!("Skipped {} unmapped reads", unmapped);
    info!(
        "Skipped {} secondary or supplementary alignments",
        not_primary
    );

    Ok(counts)
}

/**
 * Observed per-transcript counts of a real sample from an existing alignment.
 */
pub fn observed_counts_from_sam(sam_path: &Path) -> Result<Vec<u64>> {
    Ok(count_primary_alignments(sam_path)?.into_values().collect())
}

/**
 * Align the reads of a real sample and return the observed per-transcript counts. The alignment
 * is removed afterwards.
 */
pub fn observed_counts_from_reads(
    reference: &Path,
    reads: &Path,
    technology: Technology,
    cores: usize,
    sam_output: &Path,
) -> Result<Vec<u64>> {
    align_reads(reference, reads, technology, cores, sam_output)?;

    let counts = observed_counts_from_sam(sam_output)?;
    std::fs::remove_file(sam_output)?;

    Ok(counts)
}

#[cfg(test)]
#[path = "tests/alignment_tests.rs"]
mod alignment_tests;
