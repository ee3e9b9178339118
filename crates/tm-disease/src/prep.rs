//! PrEP uptake.
//!
//! Initiation is a daily Bernoulli trial with the rate that keeps coverage
//! at the target `k` in steady state given the daily stop probability `p`:
//!
//! ```text
//! rate = p * k / (1 - k)
//! ```
//!
//! The spell length is `1.1 + Geometric(p)` ticks: at least one full day,
//! and the extra `0.1` places the cessation after the step of the tick it
//! lands in.

use tm_core::{GeometricDistribution, SimRng};
use tm_person::Person;

use crate::{DiseaseError, DiseaseResult};

pub const PREP_CESSATION_OFFSET: f64 = 1.1;

#[derive(Clone, Debug)]
pub struct PrepUptake {
    initiation_prob: f64,
    cessation:       GeometricDistribution,
}

impl PrepUptake {
    pub fn new(daily_stop_prob: f64, coverage: f64) -> DiseaseResult<Self> {
        if !(0.0..1.0).contains(&coverage) {
            return Err(DiseaseError::Config(format!(
                "prep.bl.use.prop must be in [0, 1), got {coverage}"
            )));
        }
        Ok(Self {
            initiation_prob: daily_stop_prob * coverage / (1.0 - coverage),
            cessation: GeometricDistribution::new(daily_stop_prob, PREP_CESSATION_OFFSET)?,
        })
    }

    pub fn initiation_prob(&self) -> f64 {
        self.initiation_prob
    }

    /// Offer PrEP to an uninfected person.  If they are not already on PrEP,
    /// draws once for initiation and, on success, once more for the spell
    /// length.  Returns the stop time of a newly started spell.
    pub fn try_start(&self, person: &mut Person, tick: f64, rng: &mut SimRng) -> Option<f64> {
        if person.is_on_prep() || !rng.bernoulli(self.initiation_prob) {
            return None;
        }
        let stop_time = tick + self.cessation.next(rng);
        person.go_on_prep(tick, stop_time);
        Some(stop_time)
    }
}
