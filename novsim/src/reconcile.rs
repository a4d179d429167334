/**
 * file: reconcile.rs
 * desc: Fold the realized number of simulated reads back into the transcript index.
 */
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{info, warn};

use shared::index::{SimCounts, TranscriptIndex};

use crate::files::ReadOrigin;

/**
 * Tallies from a reconciliation run.
 *
 * fields
 *  reads:               number of simulated reads seen
 *  unknown_reads:       reads from transcripts that aren't in the index, these are ignored
 *  unknown_transcripts: the transcripts those reads came from
 *  absent:              index transcripts that received no reads
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub reads: usize,
    pub unknown_reads: usize,
    pub unknown_transcripts: BTreeSet<String>,
    pub absent: usize,
}

impl ReconcileReport {
    /**
     * Human readable notices for the run summary.
     */
    pub fn notes(&self) -> Vec<String> {
        let mut notes = Vec::new();

        if self.unknown_reads > 0 {
            notes.push(format!(
                "{} simulated reads came from {} transcripts missing from the index and were ignored",
                self.unknown_reads,
                self.unknown_transcripts.len()
            ));
        }
        if self.absent > 0 {
            notes.push(format!(
                "{} transcripts received no simulated reads",
                self.absent
            ));
        }

        notes
    }
}

/**
 Count simulated reads per transcript and store the counts in sim_counts. Transcripts without any
 reads are marked absent. Rows are never added, removed or reordered.

 args
  index:   transcript index
  origins: the transcript each simulated read came from

 returns
  reconciliation tallies
*/
pub fn reconcile(index: &mut TranscriptIndex, origins: &[ReadOrigin]) -> ReconcileReport {
    let mut tally: BTreeMap<&str, u64> = BTreeMap::new();

    for origin in origins.iter() {
        *tally.entry(origin.transcript_id.as_str()).or_default() += 1;
    }

    let known: HashSet<&str> = index
        .records
        .iter()
        .map(|r| r.transcript_id.as_str())
        .collect();

    let mut report = ReconcileReport {
        reads: origins.len(),
        ..Default::default()
    };

    for (tid, count) in tally.iter() {
        if !known.contains(tid) {
            report.unknown_reads += *count as usize;
            report.unknown_transcripts.insert(tid.to_string());
        }
    }

    for record in index.records.iter_mut() {
        record.sim_counts = match tally.get(record.transcript_id.as_str()) {
            Some(n) => Some(SimCounts::Count(*n)),
            None => {
                report.absent += 1;
                Some(SimCounts::Absent)
            }
        };
    }

    if report.unknown_reads > 0 {
        warn!(
            "{} reads belong to transcripts that aren't in the index",
            report.unknown_reads
        );
    }

    info!(
        "Reconciled {} simulated reads, {} of {} transcripts absent",
        report.reads,
        report.absent,
        index.len()
    );

    report
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod reconcile_tests;
