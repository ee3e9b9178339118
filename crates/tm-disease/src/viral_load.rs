//! Viral load (log10 copies/ml) over the course of infection.
//!
//! Untreated trajectory, in ticks since infection:
//!
//! | Interval                    | Viral load                                   |
//! |-----------------------------|----------------------------------------------|
//! | `[0, t_peak]`               | rises linearly from 0 to `peak`              |
//! | `(t_peak, t_set]`           | falls linearly from `peak` to `set_point`    |
//! | `(t_set, t_late]`           | `set_point`                                  |
//! | `(t_late, dur_inf]`         | rises linearly from `set_point` to `late`    |
//!
//! On ART the load falls from its value at initiation by the slope fixed at
//! initiation, down to the undetectable floor.

use tm_person::InfectionRecord;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViralLoadParams {
    pub time_infection_to_peak_load:  f64,
    pub time_infection_to_set_point:  f64,
    pub time_infection_to_late_stage: f64,
    pub time_to_full_supp:            f64,
    pub peak_viral_load:              f64,
    pub set_point_viral_load:         f64,
    pub late_stage_viral_load:        f64,
    pub undetectable_viral_load:      f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViralLoadCalculator {
    pub params: ViralLoadParams,
}

impl ViralLoadCalculator {
    pub fn new(params: ViralLoadParams) -> Self {
        Self { params }
    }

    pub fn viral_load(&self, rec: &InfectionRecord) -> f64 {
        let p = &self.params;
        if rec.art_status {
            return (rec.vl_at_art_init + rec.vl_art_traj_slope * rec.time_since_art_init)
                .max(p.undetectable_viral_load);
        }

        let tsi = rec.time_since_infection;
        if tsi <= p.time_infection_to_peak_load {
            p.peak_viral_load * fraction(tsi, 0.0, p.time_infection_to_peak_load)
        } else if tsi <= p.time_infection_to_set_point {
            let f = fraction(tsi, p.time_infection_to_peak_load, p.time_infection_to_set_point);
            p.peak_viral_load + (p.set_point_viral_load - p.peak_viral_load) * f
        } else if tsi <= p.time_infection_to_late_stage {
            p.set_point_viral_load
        } else {
            let f = fraction(tsi, p.time_infection_to_late_stage, rec.dur_inf_by_age);
            p.set_point_viral_load + (p.late_stage_viral_load - p.set_point_viral_load) * f
        }
    }
}

/// Position of `x` in `[from, to]`, clamped to `[0, 1]`; 1 for an empty span.
fn fraction(x: f64, from: f64, to: f64) -> f64 {
    if to <= from {
        return 1.0;
    }
    ((x - from) / (to - from)).clamp(0.0, 1.0)
}

/// Slope of the treated viral-load trajectory.
#[derive(Clone, Debug, PartialEq)]
pub struct ViralLoadSlopeCalculator {
    pub undetectable_viral_load: f64,
    pub time_to_full_supp:       f64,
}

impl ViralLoadSlopeCalculator {
    /// Per-tick change that takes the load at ART initiation to the
    /// undetectable floor in `time_to_full_supp` ticks.
    pub fn slope(&self, rec: &InfectionRecord) -> f64 {
        (self.undetectable_viral_load - rec.vl_at_art_init) / self.time_to_full_supp
    }
}
