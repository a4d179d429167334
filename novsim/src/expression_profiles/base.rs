/**
 * file: base.rs
 * desc: Base expression profile trait which all expression models implement, and the code that
 *       writes a profile's counts into the transcript index.
 */
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use tracing::info;

use shared::index::TranscriptIndex;
use shared::util;
use shared::{Result, SimError};

/**
 * Requested read counts for the transcripts picked for simulation, plus any non-fatal notices
 * raised while building them. Transcripts not listed get zero reads.
 */
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExpressionPlan {
    pub counts: Vec<(String, u64)>,
    pub notes: Vec<String>,
}

impl ExpressionPlan {
    pub fn total_reads(&self) -> u64 {
        // Drawn counts are unbounded, saturate instead of wrapping
        self.counts
            .iter()
            .fold(0u64, |total, (_, c)| total.saturating_add(*c))
    }
}

pub trait ExpressionProfile {
    // Short name used in logs
    fn name(&self) -> &'static str;
    // Pick the transcripts to simulate and their read counts. Novel and known transcript IDs are
    // given in index order.
    fn determine_counts(
        &self,
        novel: &[String],
        known: &[String],
        rng: &mut StdRng,
    ) -> Result<ExpressionPlan>;
}

impl<T: ?Sized> ExpressionProfile for Box<T>
where
    T: ExpressionProfile,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn determine_counts(
        &self,
        novel: &[String],
        known: &[String],
        rng: &mut StdRng,
    ) -> Result<ExpressionPlan> {
        (**self).determine_counts(novel, known, rng)
    }
}

/**
 * Randomly pick up to `slots` known transcripts to simulate alongside the novel ones.
 */
pub fn choose_known(known: &[String], slots: usize, rng: &mut StdRng) -> Vec<String> {
    let mut known = known.to_vec();

    known.shuffle(rng);
    known.truncate(slots);

    known
}

/**
 Run an expression profile against the index and fill in requested_counts and requested_tpm for
 every row. Rows that aren't simulated get a count and TPM of zero. TPM is relative to the total
 number of requested reads.

 args
  index:   transcript index with sim_type assigned
  profile: expression profile to use
  rng:     seeded generator

 returns
  notices raised by the profile
*/
pub fn assign_expression<T: ExpressionProfile + ?Sized>(
    index: &mut TranscriptIndex,
    profile: &T,
    rng: &mut StdRng,
) -> Result<Vec<String>> {
    if !index.has_sim_type() {
        return Err(SimError::Config(
            "the transcript index has no sim_type column, targets must be selected first"
                .to_string(),
        ));
    }

    let (novel, known) = index.partition_by_sim_type();
    let plan = profile.determine_counts(&novel, &known, rng)?;
    let total = plan.total_reads();
    let lookup: HashMap<&str, u64> = plan
        .counts
        .iter()
        .map(|(tid, c)| (tid.as_str(), *c))
        .collect();

    for record in index.records.iter_mut() {
        let count = lookup
            .get(record.transcript_id.as_str())
            .copied()
            .unwrap_or(0);

        record.requested_counts = Some(count);
        record.requested_tpm = Some(util::count_to_tpm(count, total));
    }

    let counts: Vec<f64> = plan.counts.iter().map(|(_, c)| *c as f64).collect();

    info!(
        "Expression ({}): {} transcripts to simulate, {} reads requested, {:.2} mean reads per transcript",
        profile.name(),
        plan.counts.len(),
        total,
        util::mean(&counts)
    );

    Ok(plan.notes)
}
