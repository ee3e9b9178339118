//! CD4 count trajectory.
//!
//! Untreated, the square root of the CD4 count falls linearly with years
//! since infection:
//!
//! ```text
//! sqrt(cd4) = b1_ref + (b4_cd4_ref + b6(age)) * years_since_infection
//! ```
//!
//! floored at 0 and capped at the CD4 level at infection.  The demographic
//! terms `b2_african`, `b3_female` and `b5_african` are carried for
//! completeness; the modeled population has them all at their reference
//! level, so they do not enter the curve.
//!
//! On ART the count recovers linearly from its value at initiation for at
//! most `recovery_time` ticks.

use tm_core::TimeStep;
use tm_person::InfectionRecord;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BValues {
    pub b1_ref:          f64,
    pub b2_african:      f64,
    pub b3_female:       f64,
    pub b4_cd4_ref:      f64,
    pub b5_african:      f64,
    pub b6_age_15to29:   f64,
    pub b6_age_30to39:   f64,
    pub b6_age_40to49:   f64,
    pub b6_age_50ormore: f64,
}

impl BValues {
    /// Age adjustment to the yearly decline.
    pub fn b6(&self, age: f64) -> f64 {
        if age < 30.0 {
            self.b6_age_15to29
        } else if age < 40.0 {
            self.b6_age_30to39
        } else if age < 50.0 {
            self.b6_age_40to49
        } else {
            self.b6_age_50ormore
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cd4Calculator {
    pub step:                 TimeStep,
    /// Ticks of recovery after ART initiation.
    pub recovery_time:        f64,
    pub cd4_at_infection:     f64,
    pub per_day_cd4_recovery: f64,
    pub b:                    BValues,
}

impl Cd4Calculator {
    pub fn cd4(&self, age: f64, rec: &InfectionRecord) -> f64 {
        if rec.art_status {
            let recovering = rec.time_since_art_init.min(self.recovery_time);
            rec.cd4_at_art_init + self.per_day_cd4_recovery * self.step.days * recovering
        } else {
            let years = rec.years_since_infection(self.step.years());
            let root = (self.b.b1_ref + (self.b.b4_cd4_ref + self.b.b6(age)) * years).max(0.0);
            (root * root).min(self.cd4_at_infection)
        }
    }
}
