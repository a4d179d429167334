/**
 * file: select.rs
 * desc: Choose the transcripts that will be deleted from the reference annotation. Deleted
 *       transcripts become the "novel" ground truth of the simulation, everything else stays
 *       "known". Selection honors per-category quotas and never deletes a transcript or gene
 *       that another deletion relies on as its reference.
 */
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use shared::index::{SimType, StructuralCategory, TranscriptIndex, TranscriptRecord};

/**
 * STRUCTS
 */

/**
 * Number of transcripts to delete per structural category. Quotas are decremented as
 * transcripts get selected, whatever remains positive could not be fulfilled.
 */
pub type CategoryQuota = BTreeMap<StructuralCategory, usize>;

/**
 * Outcome of target selection.
 *
 * fields
 *  transcripts:           transcripts selected for deletion
 *  genes:                 genes of the selected transcripts
 *  removed_genes:         genes whose every isoform was selected, these are deleted as a whole
 *  protected_transcripts: reference transcripts that must stay in the annotation
 *  protected_genes:       reference genes that must stay in the annotation
 *  achieved:              number of transcripts selected per category
 */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetSet {
    pub transcripts: BTreeSet<String>,
    pub genes: BTreeSet<String>,
    pub removed_genes: BTreeSet<String>,
    pub protected_transcripts: BTreeSet<String>,
    pub protected_genes: BTreeSet<String>,
    pub achieved: BTreeMap<StructuralCategory, usize>,
}

impl TargetSet {
    /**
     * IDs to drop from the annotation: every selected transcript plus fully deleted genes.
     */
    pub fn deletion_ids(&self) -> BTreeSet<String> {
        self.transcripts
            .union(&self.removed_genes)
            .cloned()
            .collect()
    }

    /**
     * Can the given transcript be deleted without breaking a reference another deletion depends
     * on?
     */
    fn is_admissible(&self, record: &TranscriptRecord) -> bool {
        if self.transcripts.contains(&record.transcript_id)
            || self.protected_transcripts.contains(&record.transcript_id)
            || self.protected_genes.contains(&record.gene_id)
        {
            return false;
        }

        match record.structural_category {
            StructuralCategory::FullSpliceMatch | StructuralCategory::IncompleteSpliceMatch => {
                // A transcript referencing itself would end up protected and deleted at once
                record.ref_transcript != record.transcript_id
                    && !self.transcripts.contains(&record.ref_transcript)
            }
            StructuralCategory::Intergenic => !self.genes.contains(&record.gene_id),
            // Every constituent of a composite reference must survive
            _ => {
                !self.genes.contains(&record.gene_id)
                    && record.ref_genes.iter().all(|g| !self.genes.contains(g))
            }
        }
    }

    fn admit(&mut self, record: &TranscriptRecord) {
        self.transcripts.insert(record.transcript_id.clone());
        self.genes.insert(record.gene_id.clone());

        match record.structural_category {
            StructuralCategory::FullSpliceMatch | StructuralCategory::IncompleteSpliceMatch => {
                self.protected_transcripts
                    .insert(record.ref_transcript.clone());
            }
            StructuralCategory::Intergenic => {}
            _ => self
                .protected_genes
                .extend(record.ref_genes.iter().cloned()),
        }

        *self
            .achieved
            .entry(record.structural_category)
            .or_default() += 1;
    }
}

/**
 * FUNCTIONS
 */

/**
 Select transcripts to delete from the annotation and label every index row as novel or known.

 Categories are processed in canonical order. A single generator seeded with the given seed
 hands out one seed per category, used to shuffle that category's candidates, so each
 category's ordering is reproducible regardless of the other quotas. Candidates are then scanned
 in shuffled order until the category quota is met or candidates run out.

 args
  index:  transcript index, sim_type gets assigned for every row
  quotas: transcripts to delete per category, decremented in place
  seed:   random seed

 returns
  the selected targets and the references they depend on
*/
pub fn select_targets(
    index: &mut TranscriptIndex,
    quotas: &mut CategoryQuota,
    seed: u64,
) -> TargetSet {
    let mut by_category: BTreeMap<StructuralCategory, Vec<usize>> = BTreeMap::new();

    for (i, record) in index.records.iter().enumerate() {
        by_category
            .entry(record.structural_category)
            .or_default()
            .push(i);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut targets = TargetSet::default();

    for category in StructuralCategory::ALL {
        // Always advance the generator so a category's shuffle doesn't depend on other quotas
        let category_seed: u64 = rng.gen();

        let remaining = match quotas.get_mut(&category) {
            Some(q) if *q > 0 => q,
            _ => continue,
        };

        let mut candidates = by_category.get(&category).cloned().unwrap_or_default();
        candidates.shuffle(&mut StdRng::seed_from_u64(category_seed));

        for i in candidates {
            if *remaining == 0 {
                break;
            }

            let record = &index.records[i];

            if targets.is_admissible(record) {
                targets.admit(record);
                *remaining -= 1;
            }
        }
    }

    targets.removed_genes = fully_selected_genes(index, &targets);

    for record in index.records.iter_mut() {
        record.sim_type = if targets.transcripts.contains(&record.transcript_id) {
            Some(SimType::Novel)
        } else {
            Some(SimType::Known)
        };
    }

    info!(
        "Selected {} transcripts for deletion, {} genes lose all of their isoforms",
        targets.transcripts.len(),
        targets.removed_genes.len()
    );

    targets
}

/**
 * Genes for which every annotated isoform was selected.
 */
fn fully_selected_genes(index: &TranscriptIndex, targets: &TargetSet) -> BTreeSet<String> {
    // gene -> (isoforms, selected isoforms)
    let mut isoforms: BTreeMap<&str, (usize, usize)> = BTreeMap::new();

    for record in index.records.iter() {
        let entry = isoforms.entry(record.gene_id.as_str()).or_default();
        entry.0 += 1;

        if targets.transcripts.contains(&record.transcript_id) {
            entry.1 += 1;
        }
    }

    isoforms
        .into_iter()
        .filter(|(_, (total, selected))| *selected > 0 && selected == total)
        .map(|(gene, _)| gene.to_string())
        .collect()
}

#[cfg(test)]
#[path = "tests/select_tests.rs"]
mod select_tests;
