//! Diagnosis-to-treatment lag and ART adherence.

use tm_core::{SimRng, TimeStep};
use tm_person::{AdherenceCategory, AdherenceRecord};

use crate::{DiseaseError, DiseaseResult};

// ── ArtLagCalculator ──────────────────────────────────────────────────────────

/// One lag bin: a whole-day range `[min_days, max_days]` chosen with
/// probability `prob`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LagBin {
    pub min_days: u32,
    pub max_days: u32,
    pub prob:     f64,
}

/// Samples the delay between a positive test and ART initiation.
///
/// One uniform draw picks a bin by cumulative probability, then a second
/// draw picks a whole number of days uniformly inside it.  The result is
/// returned in ticks, rounded up, so it is never less than one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct ArtLagCalculator {
    bins:       Vec<LagBin>,
    cumulative: Vec<f64>,
}

impl ArtLagCalculator {
    pub fn new(bins: Vec<LagBin>) -> DiseaseResult<Self> {
        if bins.is_empty() {
            return Err(DiseaseError::Config("no ART lag bins configured".into()));
        }
        let mut cumulative = Vec::with_capacity(bins.len());
        let mut total = 0.0;
        for bin in &bins {
            if bin.min_days == 0 || bin.min_days > bin.max_days {
                return Err(DiseaseError::Config(format!(
                    "ART lag bin {}-{} must satisfy 1 <= min <= max",
                    bin.min_days, bin.max_days
                )));
            }
            if !(0.0..=1.0).contains(&bin.prob) {
                return Err(DiseaseError::Config(format!(
                    "ART lag bin {}-{} has probability {} outside [0, 1]",
                    bin.min_days, bin.max_days, bin.prob
                )));
            }
            total += bin.prob;
            cumulative.push(total);
        }
        if (total - 1.0).abs() > 1e-6 {
            return Err(DiseaseError::Config(format!("ART lag bin probabilities sum to {total}, not 1")));
        }
        Ok(Self { bins, cumulative })
    }

    pub fn bins(&self) -> &[LagBin] {
        &self.bins
    }

    /// Lag in ticks.  Consumes two draws.
    pub fn lag(&self, step: TimeStep, rng: &mut SimRng) -> f64 {
        let draw = rng.uniform();
        let i = self
            .cumulative
            .iter()
            .position(|&cum| draw <= cum)
            .unwrap_or(self.bins.len() - 1);
        let bin = self.bins[i];
        let days = rng.gen_range(bin.min_days..=bin.max_days);
        step.ticks_for_days(f64::from(days)).ceil().max(1.0)
    }
}

// ── AdherenceAssigner ─────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AdherenceParams {
    /// Share of persons in each category.
    pub prop_never:          f64,
    pub prop_always:         f64,
    pub prop_partial_pos:    f64,
    pub prop_partial_neg:    f64,
    /// Chance of adhering over one window, by category.
    pub never_prob:          f64,
    pub always_prob:         f64,
    pub partial_pos_prob:    f64,
    pub partial_neg_prob:    f64,
    /// Ticks between adherence checks.
    pub window_length:       f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AdherenceAssigner {
    params: AdherenceParams,
}

impl AdherenceAssigner {
    pub fn new(params: AdherenceParams) -> DiseaseResult<Self> {
        let total = params.prop_never + params.prop_always + params.prop_partial_pos + params.prop_partial_neg;
        if (total - 1.0).abs() > 1e-6 {
            return Err(DiseaseError::Config(format!("adherence category proportions sum to {total}, not 1")));
        }
        if params.window_length < 1.0 {
            return Err(DiseaseError::Config(format!(
                "partial.art_adher.window.length must be at least one tick, got {}",
                params.window_length
            )));
        }
        Ok(Self { params })
    }

    pub fn window_length(&self) -> f64 {
        self.params.window_length
    }

    pub fn probability_for(&self, category: AdherenceCategory) -> f64 {
        let p = &self.params;
        match category {
            AdherenceCategory::Na => 0.0,
            AdherenceCategory::Never => p.never_prob,
            AdherenceCategory::Always => p.always_prob,
            AdherenceCategory::PartialPos => p.partial_pos_prob,
            AdherenceCategory::PartialNeg => p.partial_neg_prob,
        }
    }

    /// Draw a category.  Consumes one uniform draw.
    pub fn assign(&self, rng: &mut SimRng) -> AdherenceRecord {
        let p = &self.params;
        let draw = rng.uniform();
        let category = if draw <= p.prop_never {
            AdherenceCategory::Never
        } else if draw <= p.prop_never + p.prop_always {
            AdherenceCategory::Always
        } else if draw <= p.prop_never + p.prop_always + p.prop_partial_pos {
            AdherenceCategory::PartialPos
        } else {
            AdherenceCategory::PartialNeg
        };
        self.record_for(category)
    }

    /// A fresh record for a known category.
    pub fn record_for(&self, category: AdherenceCategory) -> AdherenceRecord {
        AdherenceRecord {
            category,
            probability: self.probability_for(category),
            ..AdherenceRecord::default()
        }
    }
}
