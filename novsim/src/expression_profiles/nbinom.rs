/**
 * file: nbinom.rs
 * desc: The negative binomial expression profile. Read counts for known and novel transcripts are
 *       drawn from two separately parameterized negative binomial distributions.
 */
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Gamma, Poisson};
use tracing::info;

use shared::{Result, SimError};

use super::base;

/**
 * Negative binomial distribution counting failures before `n` successes with success probability
 * `p`. Sampled as a gamma-poisson mixture, which also covers non-integer `n`.
 */
#[derive(Debug, Clone, Copy)]
pub struct NegativeBinomial {
    n: f64,
    p: f64,
    // None when p == 1, every draw is then zero
    gamma: Option<Gamma<f64>>,
}

impl NegativeBinomial {
    pub fn new(n: f64, p: f64) -> Result<NegativeBinomial> {
        if !(n > 0.0) || !n.is_finite() {
            return Err(SimError::Config(format!(
                "negative binomial n must be positive, got {}",
                n
            )));
        }
        if !(p > 0.0 && p <= 1.0) {
            return Err(SimError::Config(format!(
                "negative binomial p must be in (0, 1], got {}",
                p
            )));
        }

        let gamma = if p < 1.0 {
            Some(Gamma::new(n, (1.0 - p) / p).map_err(|e| SimError::Config(e.to_string()))?)
        } else {
            None
        };

        Ok(NegativeBinomial { n, p, gamma })
    }

    // Expected number of failures, n(1-p)/p
    pub fn mean(&self) -> f64 {
        self.n * (1.0 - self.p) / self.p
    }
}

impl Distribution<u64> for NegativeBinomial {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        let lambda = match self.gamma {
            Some(gamma) => gamma.sample(rng),
            None => return 0,
        };

        // Poisson rejects a zero rate, which just means no failures
        match Poisson::new(lambda) {
            Ok(poisson) => poisson.sample(rng) as u64,
            Err(_) => 0,
        }
    }
}

pub struct NegativeBinomialExpressionProfile {
    // Caps the number of simulated transcripts, novel transcripts are always kept
    pub n_trans: Option<usize>,
    pub known: NegativeBinomial,
    pub novel: NegativeBinomial,
}

impl base::ExpressionProfile for NegativeBinomialExpressionProfile {
    fn name(&self) -> &'static str {
        "custom"
    }

    fn determine_counts(
        &self,
        novel: &[String],
        known: &[String],
        rng: &mut StdRng,
    ) -> Result<base::ExpressionPlan> {
        let known = match self.n_trans {
            Some(n) => base::choose_known(known, n.saturating_sub(novel.len()), rng),
            None => known.to_vec(),
        };

        info!(
            "Negative binomial means: {:.2} reads per known transcript, {:.2} per novel",
            self.known.mean(),
            self.novel.mean()
        );

        // Every simulated transcript gets at least one read
        let mut counts = Vec::with_capacity(novel.len() + known.len());

        for tid in known.iter() {
            counts.push((tid.clone(), self.known.sample(rng).max(1)));
        }
        for tid in novel.iter() {
            counts.push((tid.clone(), self.novel.sample(rng).max(1)));
        }

        Ok(base::ExpressionPlan {
            counts,
            notes: Vec::new(),
        })
    }
}
