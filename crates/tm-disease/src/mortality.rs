//! Competing-risk mortality.
//!
//! Causes are checked in a fixed priority and the first hit wins:
//!
//! 1. age above the maximum,
//! 2. untreated infection past its survival cap,
//! 3. background (age-specific) mortality, one uniform draw.
//!
//! The background draw is consumed only when the first two checks fail.

use std::fmt;

use tm_core::SimRng;
use tm_person::Person;

use crate::{DiseaseError, DiseaseResult};

// ── CauseOfDeath ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CauseOfDeath {
    None,
    Age,
    /// Age-specific background mortality.
    Asm,
    Infection,
}

impl CauseOfDeath {
    /// # Panics
    ///
    /// On `CauseOfDeath::None`: a living person ends no partnerships.
    pub fn partnership_end(self) -> PartnershipEnd {
        match self {
            CauseOfDeath::Age => PartnershipEnd::AgingOut,
            CauseOfDeath::Asm => PartnershipEnd::DeathAsm,
            CauseOfDeath::Infection => PartnershipEnd::DeathInfection,
            CauseOfDeath::None => panic!("no partnership end event for CauseOfDeath::None"),
        }
    }
}

impl fmt::Display for CauseOfDeath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CauseOfDeath::None => "none",
            CauseOfDeath::Age => "age",
            CauseOfDeath::Asm => "asm",
            CauseOfDeath::Infection => "infection",
        };
        f.write_str(s)
    }
}

/// Why a partnership ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PartnershipEnd {
    AgingOut,
    DeathAsm,
    DeathInfection,
}

impl fmt::Display for PartnershipEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PartnershipEnd::AgingOut => "ended_aging_out",
            PartnershipEnd::DeathAsm => "ended_death_asm",
            PartnershipEnd::DeathInfection => "ended_death_infection",
        };
        f.write_str(s)
    }
}

// ── AgeBinMortality ───────────────────────────────────────────────────────────

/// Daily death probability for ages in `[lower, upper)`; `upper: None`
/// marks the open-ended last bin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MortalityBin {
    pub lower: f64,
    pub upper: Option<f64>,
    pub prob:  f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AgeBinMortality {
    bins: Vec<MortalityBin>,
}

impl AgeBinMortality {
    /// `bins` may arrive in any order; they are sorted by lower bound and
    /// must then be contiguous, with only the last one open-ended.
    pub fn new(mut bins: Vec<MortalityBin>) -> DiseaseResult<Self> {
        bins.sort_by(|a, b| a.lower.total_cmp(&b.lower));
        for (i, bin) in bins.iter().enumerate() {
            let last = i + 1 == bins.len();
            match bin.upper {
                None if !last => {
                    return Err(DiseaseError::Config(format!(
                        "mortality bin starting at {} is open-ended but not last",
                        bin.lower
                    )));
                }
                Some(upper) if upper <= bin.lower => {
                    return Err(DiseaseError::Config(format!(
                        "mortality bin {}-{upper} is empty",
                        bin.lower
                    )));
                }
                Some(upper) if !last && bins[i + 1].lower != upper => {
                    return Err(DiseaseError::Config(format!(
                        "mortality bins leave a gap or overlap at {upper}"
                    )));
                }
                _ => {}
            }
        }
        Ok(Self { bins })
    }

    pub fn probability(&self, age: f64) -> f64 {
        self.bins
            .iter()
            .find(|b| age >= b.lower && b.upper.is_none_or(|u| age < u))
            .map_or(0.0, |b| b.prob)
    }

    /// `true` if `draw` falls under the probability for `age`.
    pub fn dies(&self, age: f64, draw: f64) -> bool {
        let p = self.probability(age);
        p > 0.0 && draw <= p
    }

    /// Evaluate the three causes in priority order.
    pub fn cause_of_death(&self, person: &Person, max_age: f64, rng: &mut SimRng) -> CauseOfDeath {
        if person.dead_of_age(max_age) {
            CauseOfDeath::Age
        } else if person.dead_of_infection() {
            CauseOfDeath::Infection
        } else if self.dies(person.age, rng.uniform()) {
            CauseOfDeath::Asm
        } else {
            CauseOfDeath::None
        }
    }
}
