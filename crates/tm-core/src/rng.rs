//! The simulation's single random stream.
//!
//! # Determinism strategy
//!
//! Every stochastic decision in the model (role assignment, per-edge sex act
//! and condom draws, PrEP, diagnosis, mortality, entries, external
//! infections) pulls from one `SimRng`, in the fixed order of the per-tick
//! pipeline.  A fixed seed therefore reproduces a run bit for bit.  There is
//! no per-agent stream and no thread-local state.
//!
//! `SimRng` is `Clone` so tests can replay the exact draws the model is
//! about to consume.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Geometric};

use crate::{CoreError, CoreResult};

// ── SimRng ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// One uniform draw in `[0, 1)`.
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    /// `true` iff one uniform draw is `<= p`.
    ///
    /// Unlike `Rng::gen_bool` this always consumes exactly one draw and
    /// accepts any `p` (values outside `[0, 1]` saturate naturally).
    #[inline]
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.uniform() <= p
    }

    /// One uniform draw scaled into `[min, max)`; `min` when they are equal.
    #[inline]
    pub fn uniform_between(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.uniform()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Draw from any `rand_distr` distribution.
    #[inline]
    pub fn sample<T, D: Distribution<T>>(&mut self, distr: &D) -> T {
        distr.sample(&mut self.0)
    }
}

// ── GeometricDistribution ─────────────────────────────────────────────────────

/// Number of failures before the first success of a daily Bernoulli trial,
/// shifted by a constant offset.
///
/// Used for inter-test intervals (offset 1) and PrEP duration (offset 1.1:
/// at least one full day on PrEP, and the cessation lands after the step
/// loop of the tick it falls in).
#[derive(Clone, Debug)]
pub struct GeometricDistribution {
    inner:  Geometric,
    offset: f64,
}

impl GeometricDistribution {
    pub fn new(p: f64, offset: f64) -> CoreResult<Self> {
        let inner = Geometric::new(p)
            .map_err(|e| CoreError::Distribution(format!("geometric(p = {p}): {e}")))?;
        Ok(Self { inner, offset })
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// `offset + k` where `k` is the failure count.
    #[inline]
    pub fn next(&self, rng: &mut SimRng) -> f64 {
        self.offset + rng.sample(&self.inner) as f64
    }
}
