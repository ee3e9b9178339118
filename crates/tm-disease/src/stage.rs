//! Disease stages and stage-specific infectivity.
//!
//! # Lookup
//!
//! Stages cover `[0, ∞)` without gaps as half-open ranges:
//!
//! ```text
//! Acute   [0,          acute_max)
//! Chronic [acute_max,  chronic_max)
//! Late    [chronic_max, ∞)
//! ```
//!
//! A time since infection equal to a boundary belongs to the stage that
//! starts there.  Late is open-ended because a treated person can stay in it
//! indefinitely.
//!
//! # Infectivity
//!
//! Every stage starts from the viral-load-shaped baseline
//!
//! ```text
//! base = baseline_infectivity * vl_increment ^ (viral_load - 4.0)
//! ```
//!
//! (each log10 above 4.0 multiplies per-act infectivity by `vl_increment`).
//! Acute and late scale it by `1 + (mult - 1) * position`, where the
//! position factor is 1 at the start of acute and falls to 0 at its end, and
//! is 0 at the start of late and rises to 1 at the untreated survival cap.

use tm_person::InfectionRecord;

use crate::{DiseaseError, DiseaseResult};

/// Log10 viral load at which `base == baseline_infectivity`.
pub const REFERENCE_LOG_VIRAL_LOAD: f64 = 4.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    Acute,
    Chronic,
    Late,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stage {
    pub kind:                 StageKind,
    pub lower:                f64,
    pub upper:                f64,
    pub baseline_infectivity: f64,
    /// Stage multiplier; 1 for chronic.
    pub mult:                 f64,
    pub vl_increment:         f64,
}

impl Stage {
    #[inline]
    pub fn contains(&self, tsi: f64) -> bool {
        self.lower <= tsi && tsi < self.upper
    }

    pub fn infectivity(&self, rec: &InfectionRecord) -> f64 {
        let base = self.baseline_infectivity
            * self.vl_increment.powf(rec.viral_load - REFERENCE_LOG_VIRAL_LOAD);
        let tsi = rec.time_since_infection;
        let position = match self.kind {
            StageKind::Chronic => return base,
            StageKind::Acute => clamp_unit((self.upper - tsi) / (self.upper - self.lower)),
            StageKind::Late => {
                let span = rec.dur_inf_by_age - self.lower;
                if span > 0.0 { clamp_unit((tsi - self.lower) / span) } else { 1.0 }
            }
        };
        base * (1.0 + (self.mult - 1.0) * position)
    }
}

fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// The three stages, ordered by upper bound.
#[derive(Clone, Debug, PartialEq)]
pub struct StageMap {
    stages: [Stage; 3],
}

impl StageMap {
    pub fn new(
        acute_max: f64,
        chronic_max: f64,
        acute_mult: f64,
        late_mult: f64,
        baseline_infectivity: f64,
        vl_increment: f64,
    ) -> DiseaseResult<Self> {
        if !(acute_max > 0.0 && chronic_max > acute_max) {
            return Err(DiseaseError::Config(format!(
                "stage bounds must satisfy 0 < acute.length.max ({acute_max}) < chronic.length.max ({chronic_max})"
            )));
        }
        let stage = |kind, lower, upper, mult| Stage {
            kind,
            lower,
            upper,
            baseline_infectivity,
            mult,
            vl_increment,
        };
        Ok(Self {
            stages: [
                stage(StageKind::Acute, 0.0, acute_max, acute_mult),
                stage(StageKind::Chronic, acute_max, chronic_max, 1.0),
                stage(StageKind::Late, chronic_max, f64::INFINITY, late_mult),
            ],
        })
    }

    /// The stage whose range contains `tsi`; negative values map to acute.
    pub fn stage_for(&self, tsi: f64) -> &Stage {
        self.stages
            .iter()
            .find(|s| tsi < s.upper)
            .unwrap_or(&self.stages[2])
    }

    pub fn infectivity(&self, rec: &InfectionRecord) -> f64 {
        self.stage_for(rec.time_since_infection).infectivity(rec)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}
