/**
 * file: summary.rs
 * desc: Run summaries. Non-fatal problems are collected while a step runs and reported together
 *       at the end, along with the requested vs. deleted transcripts per category.
 */
use tracing::{info, warn};

use shared::index::StructuralCategory;

use crate::select::{CategoryQuota, TargetSet};

/**
 * One row of the deletion summary.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionRow {
    pub category: StructuralCategory,
    pub requested: usize,
    pub deleted: usize,
}

impl DeletionRow {
    pub fn is_fulfilled(&self) -> bool {
        self.deleted >= self.requested
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub deletions: Vec<DeletionRow>,
    pub notes: Vec<String>,
}

impl RunSummary {
    pub fn new() -> RunSummary {
        RunSummary::default()
    }

    pub fn extend_notes<I: IntoIterator<Item = String>>(&mut self, notes: I) {
        self.notes.extend(notes);
    }

    /**
     Record how many transcripts were deleted per category compared to what was requested.
     Every category with a positive request or at least one deletion gets a row, an unfulfilled
     quota also adds a note.

     args
      requested: quotas before selection
      targets:   selection outcome
    */
    pub fn record_deletions(&mut self, requested: &CategoryQuota, targets: &TargetSet) {
        for category in StructuralCategory::ALL {
            let requested = requested.get(&category).copied().unwrap_or(0);
            let deleted = targets.achieved.get(&category).copied().unwrap_or(0);

            if requested == 0 && deleted == 0 {
                continue;
            }

            let row = DeletionRow {
                category,
                requested,
                deleted,
            };

            if !row.is_fulfilled() {
                self.notes.push(format!(
                    "{}: only {} of {} requested transcripts could be deleted",
                    category, deleted, requested
                ));
            }

            self.deletions.push(row);
        }
    }

    /**
     * Deletion table rows as (category, requested, deleted) text.
     */
    pub fn deletion_table(&self) -> Vec<String> {
        let width = self
            .deletions
            .iter()
            .map(|r| r.category.label().len())
            .max()
            .unwrap_or(0)
            .max("category".len());

        let mut lines = vec![format!(
            "{:<width$}\t{}\t{}",
            "category",
            "requested",
            "deleted",
            width = width
        )];

        for row in self.deletions.iter() {
            lines.push(format!(
                "{:<width$}\t{}\t{}",
                row.category.label(),
                row.requested,
                row.deleted,
                width = width
            ));
        }

        lines
    }

    /**
     * Send the summary to the log.
     */
    pub fn log(&self) {
        if !self.deletions.is_empty() {
            info!("Deletion summary");

            for line in self.deletion_table() {
                info!("{}", line);
            }
        }

        for note in self.notes.iter() {
            warn!("{}", note);
        }
    }
}
