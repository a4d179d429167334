/**
 * file: sample.rs
 * desc: The sample expression profile. Read counts are resampled from the per-transcript counts
 *       observed in a real long-read sample, biased so novel transcripts tend to get low counts
 *       and known transcripts high ones.
 */
use rand::rngs::StdRng;
use rand::Rng;
use stats::median;

use shared::{Result, SimError};

use super::base;

/**
 * Acceptance probability as a function of a sampled count. Flat at low_prob up to the median of
 * the lower half of the observed distribution, flat at high_prob from the median of the upper
 * half, linear in between.
 */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityRamp {
    pub low_median: f64,
    pub high_median: f64,
    pub low_prob: f64,
    pub high_prob: f64,
}

impl ProbabilityRamp {
    /**
     * Build the ramp from a sorted count distribution.
     *
     * args
     *  sorted:    observed counts in ascending order, must not be empty
     *  low_prob:  probability below the lower half median
     *  high_prob: probability above the upper half median
     */
    pub fn from_sorted_counts(sorted: &[u64], low_prob: f64, high_prob: f64) -> ProbabilityRamp {
        let (low, high) = sorted.split_at(sorted.len() / 2);
        let first = sorted.first().copied().unwrap_or(0) as f64;
        let low_median = median(low.iter().copied()).unwrap_or(first);
        let high_median = median(high.iter().copied()).unwrap_or(low_median);

        ProbabilityRamp {
            low_median,
            high_median,
            low_prob,
            high_prob,
        }
    }

    pub fn probability(&self, count: u64) -> f64 {
        let x = count as f64;

        if x <= self.low_median {
            self.low_prob
        } else if x >= self.high_median {
            self.high_prob
        } else {
            let fraction = (x - self.low_median) / (self.high_median - self.low_median);

            self.low_prob + fraction * (self.high_prob - self.low_prob)
        }
    }
}

pub struct SampleExpressionProfile {
    // Observed per-transcript counts, ascending
    pub distribution: Vec<u64>,
    pub ramp: ProbabilityRamp,
    // Sampling gives up after this many attempts per transcript slot
    pub max_attempts_per_slot: usize,
}

impl SampleExpressionProfile {
    /**
     * Create the profile from observed per-transcript read counts.
     */
    pub fn new(
        observed: Vec<u64>,
        low_prob: f64,
        high_prob: f64,
        max_attempts_per_slot: usize,
    ) -> Result<SampleExpressionProfile> {
        let mut distribution: Vec<u64> = observed.into_iter().filter(|c| *c > 0).collect();

        if distribution.is_empty() {
            return Err(SimError::Config(
                "no transcript received a primary alignment, can't derive an expression distribution"
                    .to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&low_prob) || !(0.0..=1.0).contains(&high_prob) {
            return Err(SimError::Config(format!(
                "ramp probabilities must be within [0, 1], got {} and {}",
                low_prob, high_prob
            )));
        }
        if low_prob > high_prob {
            return Err(SimError::Config(format!(
                "low probability ({}) is larger than high probability ({})",
                low_prob, high_prob
            )));
        }

        distribution.sort_unstable();
        let ramp = ProbabilityRamp::from_sorted_counts(&distribution, low_prob, high_prob);

        Ok(SampleExpressionProfile {
            distribution,
            ramp,
            max_attempts_per_slot,
        })
    }

    /**
     Draw counts with replacement from the observed distribution, keeping a draw when the
     acceptance test passes for a uniform value and the ramp probability of the drawn count.

     args
      slots:  number of counts to produce
      class:  novel or known, only used in errors
      accept: acceptance test taking (uniform draw, ramp probability)
      rng:    seeded generator

     returns
      the accepted counts, or an error once the attempt budget is used up
    */
    fn draw<F>(&self, slots: usize, class: &'static str, accept: F, rng: &mut StdRng) -> Result<Vec<u64>>
    where
        F: Fn(f64, f64) -> bool,
    {
        let budget = slots.saturating_mul(self.max_attempts_per_slot);
        let mut counts = Vec::with_capacity(slots);
        let mut attempts = 0;

        while counts.len() < slots {
            if attempts >= budget {
                return Err(SimError::SamplingExhausted {
                    class,
                    missing: slots - counts.len(),
                    attempts,
                });
            }
            attempts += 1;

            let count = self.distribution[rng.gen_range(0..self.distribution.len())];
            let r: f64 = rng.gen();

            if accept(r, self.ramp.probability(count)) {
                counts.push(count);
            }
        }

        Ok(counts)
    }
}

impl base::ExpressionProfile for SampleExpressionProfile {
    fn name(&self) -> &'static str {
        "sample"
    }

    fn determine_counts(
        &self,
        novel: &[String],
        known: &[String],
        rng: &mut StdRng,
    ) -> Result<base::ExpressionPlan> {
        // As many transcripts are simulated as were observed in the sample
        let known_slots = self.distribution.len().saturating_sub(novel.len());
        let known = base::choose_known(known, known_slots, rng);

        // Novel transcripts favor counts with a low ramp probability, known ones a high one
        let novel_counts = self.draw(novel.len(), "novel", |r, p| r > p, rng)?;
        let known_counts = self.draw(known.len(), "known", |r, p| r < p, rng)?;

        Ok(base::ExpressionPlan {
            counts: novel
                .iter()
                .cloned()
                .zip(novel_counts)
                .chain(known.into_iter().zip(known_counts))
                .collect(),
            notes: Vec::new(),
        })
    }
}
