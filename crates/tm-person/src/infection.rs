//! Per-person infection and treatment state.

/// Disease and ART state of one individual.
///
/// The infection fields are meaningful only while `infected` is `true`, and
/// the `art_*` / `*_at_art_init` fields only while `art_status` is `true`.
/// Times are absolute ticks; durations are counted in whole ticks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InfectionRecord {
    pub infected:             bool,
    /// Ticks since infection; 0 on the tick of infection.
    pub time_since_infection: f64,
    pub time_of_infection:    f64,
    /// Age in years when infected.
    pub age_at_infection:     f64,
    /// Untreated survival cap in ticks, fixed at infection from the age band.
    pub dur_inf_by_age:       f64,
    /// log10 copies/ml.
    pub viral_load:           f64,
    pub cd4_count:            f64,

    pub art_status:           bool,
    pub time_since_art_init:  f64,
    pub time_of_art_init:     f64,
    pub cd4_at_art_init:      f64,
    pub vl_at_art_init:       f64,
    /// Per-tick change in log viral load while on ART.
    pub vl_art_traj_slope:    f64,
}

impl InfectionRecord {
    /// Years since infection given the length of one tick in years.
    #[inline]
    pub fn years_since_infection(&self, tick_years: f64) -> f64 {
        self.time_since_infection * tick_years
    }
}
