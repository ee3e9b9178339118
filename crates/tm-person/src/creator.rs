//! Creation of new persons, at entry or from a snapshot.
//!
//! # Draw order
//!
//! `PersonCreator::create` consumes the shared stream in a fixed order:
//!
//! | # | Draw                                   | Distribution                          |
//! |---|----------------------------------------|---------------------------------------|
//! | 1 | circumcision                           | Bernoulli(`circum.rate`)              |
//! | 2 | first test delay                       | Geometric(`daily.testing.prob`) + 1   |
//! | 3 | steady role                            | one uniform against the role table    |
//! | 4 | casual role                            | one uniform against the role table    |
//! | 5 | non-tester flag                        | Bernoulli(`non.testers.prop`)         |

use log::debug;

use tm_core::{CoreResult, GeometricDistribution, PersonId, SimRng};

use crate::{Diagnoser, Person, PersonSnapshot, SexualRole};

/// Probability of being exclusively insertive or exclusively receptive in
/// one partnership context; the remainder is versatile.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RoleProbabilities {
    pub insertive: f64,
    pub receptive: f64,
}

impl RoleProbabilities {
    fn draw(&self, rng: &mut SimRng) -> SexualRole {
        let draw = rng.uniform();
        if draw <= self.insertive {
            SexualRole::Insertive
        } else if draw <= self.insertive + self.receptive {
            SexualRole::Receptive
        } else {
            SexualRole::Versatile
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CreatorParams {
    pub circum_rate:        f64,
    pub non_testers_prop:   f64,
    pub daily_testing_prob: f64,
    pub detection_window:   f64,
    pub steady_roles:       RoleProbabilities,
    pub casual_roles:       RoleProbabilities,
}

pub struct PersonCreator {
    params:       CreatorParams,
    testing_dist: GeometricDistribution,
    next_id:      PersonId,
}

impl PersonCreator {
    pub fn new(params: CreatorParams) -> CoreResult<Self> {
        Ok(Self {
            params,
            testing_dist: GeometricDistribution::new(params.daily_testing_prob, 1.0)?,
            next_id: PersonId(0),
        })
    }

    /// Inter-test interval distribution shared by every diagnoser.
    pub fn testing_dist(&self) -> &GeometricDistribution {
        &self.testing_dist
    }

    pub fn detection_window(&self) -> f64 {
        self.params.detection_window
    }

    /// The id the next created person will receive.
    pub fn next_id(&self) -> PersonId {
        self.next_id
    }

    /// Keep later `create` calls from handing out `id` again.
    pub fn reserve(&mut self, id: PersonId) {
        if id >= self.next_id {
            self.next_id = id.next();
        }
    }

    /// A new uninfected person of `age` entering at `tick`.
    pub fn create(&mut self, tick: f64, age: f64, rng: &mut SimRng) -> Person {
        let circumcised = rng.bernoulli(self.params.circum_rate);
        let diagnoser = Diagnoser::new(tick, self.params.detection_window, &self.testing_dist, rng);
        let steady_role = self.params.steady_roles.draw(rng);
        let casual_role = self.params.casual_roles.draw(rng);

        let id = self.next_id;
        self.next_id = id.next();

        let mut person = Person::new(id, age, circumcised, steady_role, casual_role, diagnoser);
        person.testable = !rng.bernoulli(self.params.non_testers_prop);
        person
    }

    /// Rebuild a person from exported state; consumes no random draws.
    ///
    /// The restored id is kept, and later `create` calls continue above the
    /// largest id seen.
    pub fn from_snapshot(
        &mut self,
        snapshot: &PersonSnapshot,
        tick: f64,
        dur_inf_by_age: impl Fn(f64) -> f64,
    ) -> CoreResult<Person> {
        let person = snapshot.restore(tick, self.params.detection_window, dur_inf_by_age)?;
        self.reserve(person.id);
        debug!("restored {} (infected: {})", person.id, person.is_infected());
        Ok(person)
    }
}
