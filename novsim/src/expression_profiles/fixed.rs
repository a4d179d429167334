/**
 * file: fixed.rs
 * desc: The fixed-count expression profile simulates a set number of transcripts, every novel
 *       transcript plus randomly chosen known ones, all with the same read count.
 */
use rand::rngs::StdRng;
use tracing::warn;

use shared::{Result, SimError};

use super::base;

pub struct FixedExpressionProfile {
    // Number of distinct transcripts to simulate
    pub n_trans: usize,
    // Total number of reads, split evenly across n_trans
    pub read_count: u64,
}

impl base::ExpressionProfile for FixedExpressionProfile {
    fn name(&self) -> &'static str {
        "equal"
    }

    fn determine_counts(
        &self,
        novel: &[String],
        known: &[String],
        rng: &mut StdRng,
    ) -> Result<base::ExpressionPlan> {
        // Coverage is based on the requested number of transcripts, not the available ones
        let coverage = self.read_count / self.n_trans.max(1) as u64;

        if coverage == 0 {
            return Err(SimError::Config(format!(
                "{} reads over {} transcripts leaves no reads per transcript",
                self.read_count, self.n_trans
            )));
        }

        let known = base::choose_known(known, self.n_trans.saturating_sub(novel.len()), rng);
        let selected = novel.len() + known.len();
        let mut notes = Vec::new();

        if selected < self.n_trans {
            let note = format!(
                "{} transcripts were requested but only {} are annotated, simulating {} with {} reads each",
                self.n_trans, selected, selected, coverage
            );
            warn!("{}", note);
            notes.push(note);
        }

        Ok(base::ExpressionPlan {
            counts: novel
                .iter()
                .chain(known.iter())
                .map(|tid| (tid.clone(), coverage))
                .collect(),
            notes,
        })
    }
}
