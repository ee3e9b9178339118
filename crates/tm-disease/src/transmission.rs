//! Per-act transmission decision.
//!
//! # Probability composition
//!
//! Starting from the infected partner's current infectivity:
//!
//! | Condition                                        | Factor            |
//! |--------------------------------------------------|-------------------|
//! | infected partner is insertive                    | `insertive_mult`  |
//! | susceptible is insertive and circumcised         | `circum_mult`     |
//! | a condom is used                                 | `condom_mult`     |
//! | susceptible is on PrEP                           | `prep_mult`       |
//!
//! Who is insertive comes from the two partners' roles for the partnership
//! type.  When the roles do not settle it (both versatile, or both with the
//! same exclusive role) one uniform draw decides, the infected partner being
//! insertive with probability 1/2.  The decision itself is one more uniform
//! draw: infection iff `draw <= probability`.

use log::trace;

use tm_core::SimRng;
use tm_network::EdgeType;
use tm_person::{Person, SexualRole};

/// Number of age bands in the survival-cap table: `<25`, `25–34`, `35–44`, `45+`.
pub const AGE_BANDS: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub struct TransmissionParams {
    pub circum_mult:    f64,
    pub prep_mult:      f64,
    pub condom_mult:    f64,
    pub insertive_mult: f64,
    /// Untreated survival cap in ticks, per age band.
    pub dur_inf_by_age: [f64; AGE_BANDS],
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransmissionRunner {
    params: TransmissionParams,
}

impl TransmissionRunner {
    pub fn new(params: TransmissionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TransmissionParams {
        &self.params
    }

    /// Survival cap for someone infected at `age`.
    pub fn dur_inf_by_age(&self, age: f64) -> f64 {
        let band = if age < 25.0 {
            0
        } else if age < 35.0 {
            1
        } else if age < 45.0 {
            2
        } else {
            3
        };
        self.params.dur_inf_by_age[band]
    }

    /// Infect `person` at `tick` with the cap for their current age.
    pub fn infect(&self, person: &mut Person, tick: f64) {
        person.infect(self.dur_inf_by_age(person.age), tick);
    }

    /// `true` if the infected partner is insertive in this act.  Draws only
    /// when the roles are ambiguous.
    pub fn infected_is_insertive(
        &self,
        infected: &Person,
        susceptible: &Person,
        kind: EdgeType,
        rng: &mut SimRng,
    ) -> bool {
        let role = |p: &Person| match kind {
            EdgeType::Steady => p.steady_role,
            EdgeType::Casual => p.casual_role,
        };
        match (role(infected), role(susceptible)) {
            (SexualRole::Insertive, SexualRole::Receptive | SexualRole::Versatile) => true,
            (SexualRole::Versatile, SexualRole::Receptive) => true,
            (SexualRole::Receptive, SexualRole::Insertive | SexualRole::Versatile) => false,
            (SexualRole::Versatile, SexualRole::Insertive) => false,
            _ => rng.uniform() < 0.5,
        }
    }

    /// Composed per-act probability once the insertive partner is known.
    pub fn infection_probability(
        &self,
        infected: &Person,
        susceptible: &Person,
        infected_insertive: bool,
        condom_used: bool,
    ) -> f64 {
        let p = &self.params;
        let mut prob = infected.infectivity;
        if infected_insertive {
            prob *= p.insertive_mult;
        } else if susceptible.circumcised {
            prob *= p.circum_mult;
        }
        if condom_used {
            prob *= p.condom_mult;
        }
        if susceptible.is_on_prep() {
            prob *= p.prep_mult;
        }
        prob
    }

    /// Decide whether one act between `infected` and `susceptible`
    /// transmits.  Has no effect beyond the draws; the caller applies
    /// [`infect`](Self::infect).
    pub fn determine_infection(
        &self,
        infected: &Person,
        susceptible: &Person,
        condom_used: bool,
        kind: EdgeType,
        rng: &mut SimRng,
    ) -> bool {
        let insertive = self.infected_is_insertive(infected, susceptible, kind, rng);
        let prob = self.infection_probability(infected, susceptible, insertive, condom_used);
        let draw = rng.uniform();
        trace!(
            "{} -> {} ({kind}): p = {prob:.6}, draw = {draw:.6}",
            infected.id, susceptible.id
        );
        draw <= prob
    }
}
