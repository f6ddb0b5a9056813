//! Normal-distribution sampler with rejection of negative draws.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use super::EngineError;

/// Below `mean + NEGATIVE_GUARD_SDS * sd < 0` rejection sampling is refused.
const NEGATIVE_GUARD_SDS: f64 = 2.5;

/// Draw from N(mean, |sd|). Unless `allow_negative`, redraws until the value is
/// non-negative; parameters whose acceptance rate is too low fail fast instead.
pub fn sample_normal<R: Rng + ?Sized>(
    rng: &mut R,
    mean: f64,
    sd: f64,
    allow_negative: bool,
) -> Result<f64, EngineError> {
    let sd = sd.abs();
    if !mean.is_finite() || !sd.is_finite() {
        return Err(EngineError::SamplingDomain { mean, sd });
    }
    if !allow_negative && mean < 0.0 && mean + NEGATIVE_GUARD_SDS * sd < 0.0 {
        return Err(EngineError::SamplingDomain { mean, sd });
    }

    let normal = Normal::new(mean, sd).map_err(|_| EngineError::SamplingDomain { mean, sd })?;
    loop {
        let value = normal.sample(rng);
        if allow_negative || value >= 0.0 {
            return Ok(value);
        }
    }
}

/// Owns the random source for a generation pass.
pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sampler for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    pub fn sample(&mut self, mean: f64, sd: f64, allow_negative: bool) -> Result<f64, EngineError> {
        sample_normal(&mut self.rng, mean, sd, allow_negative)
    }

    /// Uniform choice; `None` only for an empty slice.
    pub fn pick<'t, T>(&mut self, options: &'t [T]) -> Option<&'t T> {
        options.choose(&mut self.rng)
    }
}
