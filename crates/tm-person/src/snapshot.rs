//! Flat per-person projection used for network snapshots.
//!
//! `PersonSnapshot::capture` and `PersonSnapshot::restore` are inverses for
//! every populated field: a person exported at tick `T` and restored at `T`
//! has the same disease, PrEP, testing and adherence state.  Fields that do
//! not apply (infection fields of an uninfected person, ART fields of a
//! person off ART, PrEP times of a person not on PrEP) export as `None`.
//!
//! Times that drive future actions are exported relative to the export tick
//! (`time_until_next_test`, `time_since_prep_initiation`,
//! `time_until_prep_cessation`) so a snapshot can seed a run that starts at
//! any tick.

use tm_core::{CoreError, CoreResult, PersonId};

use crate::{
    AdherenceCategory, AdherenceRecord, Diagnoser, InfectionRecord, Person, PrepRecord, PrepStatus,
    SexualRole,
};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersonSnapshot {
    /// Position in this export, 1-based; edges refer to persons by it.
    pub vertex_index:               u32,
    pub id:                         u32,
    pub age:                        f64,
    pub cd4_count:                  f64,
    pub circumcised:                bool,
    pub diagnosed:                  bool,
    pub number_of_tests:            u32,
    pub time_until_next_test:       f64,
    pub non_tester:                 bool,
    /// `PrepStatus::code`.
    pub prep_status:                u8,
    pub time_since_prep_initiation: Option<f64>,
    pub time_until_prep_cessation:  Option<f64>,
    /// `SexualRole::code`.
    pub role_main:                  u8,
    pub role_casual:                u8,
    pub infectivity:                f64,
    pub infected:                   bool,
    pub art_status:                 Option<bool>,
    pub time_since_infection:       Option<f64>,
    pub time_of_infection:          Option<f64>,
    pub age_at_infection:           Option<f64>,
    pub viral_load:                 f64,
    /// `AdherenceCategory::code`.
    pub adherence_category:         u8,
    pub time_since_art_init:        Option<f64>,
    pub time_of_art_init:           Option<f64>,
    pub vl_art_traj_slope:          Option<f64>,
    pub cd4_at_art_init:            Option<f64>,
    pub vl_at_art_init:             Option<f64>,
}

impl PersonSnapshot {
    /// Project `person` at `tick` under export index `vertex_index`.
    pub fn capture(person: &Person, vertex_index: u32, tick: f64) -> Self {
        let rec = &person.infection;
        let infected = rec.infected;
        let on_art = infected && rec.art_status;
        let on_prep = person.is_on_prep();
        let if_infected = |v: f64| infected.then_some(v);
        let if_on_art = |v: f64| on_art.then_some(v);

        Self {
            vertex_index,
            id: person.id.0,
            age: person.age,
            cd4_count: rec.cd4_count,
            circumcised: person.circumcised,
            diagnosed: person.diagnosed,
            number_of_tests: person.diagnoser.test_count,
            time_until_next_test: person.time_until_next_test(tick),
            non_tester: !person.testable,
            prep_status: person.prep.status.code(),
            time_since_prep_initiation: on_prep.then_some(tick - person.prep.start_time),
            time_until_prep_cessation: on_prep.then_some(person.prep.stop_time - tick),
            role_main: person.steady_role.code(),
            role_casual: person.casual_role.code(),
            infectivity: if infected { person.infectivity } else { 0.0 },
            infected,
            art_status: infected.then_some(rec.art_status),
            time_since_infection: if_infected(rec.time_since_infection),
            time_of_infection: if_infected(rec.time_of_infection),
            age_at_infection: if_infected(rec.age_at_infection),
            viral_load: if infected { rec.viral_load } else { 0.0 },
            adherence_category: person.adherence.category.code(),
            time_since_art_init: if_on_art(rec.time_since_art_init),
            time_of_art_init: if_on_art(rec.time_of_art_init),
            vl_art_traj_slope: if_on_art(rec.vl_art_traj_slope),
            cd4_at_art_init: if_on_art(rec.cd4_at_art_init),
            vl_at_art_init: if_on_art(rec.vl_at_art_init),
        }
    }

    /// Rebuild a person at `tick`.
    ///
    /// `dur_inf_by_age` supplies the untreated survival cap for the age at
    /// infection.  The adherence probability is left at 0; the model fills
    /// it in from the category.
    pub fn restore(
        &self,
        tick: f64,
        detection_window: f64,
        dur_inf_by_age: impl Fn(f64) -> f64,
    ) -> CoreResult<Person> {
        let diagnoser = Diagnoser::restore(
            detection_window,
            tick + self.time_until_next_test,
            self.number_of_tests,
        );
        let mut person = Person::new(
            PersonId(self.id),
            self.age,
            self.circumcised,
            decode(SexualRole::from_code(self.role_main), "role_main", self.role_main)?,
            decode(SexualRole::from_code(self.role_casual), "role_casual", self.role_casual)?,
            diagnoser,
        );
        person.diagnosed = self.diagnosed;
        person.testable = !self.non_tester;
        person.adherence = AdherenceRecord {
            category: decode(
                AdherenceCategory::from_code(self.adherence_category),
                "adherence_category",
                self.adherence_category,
            )?,
            ..AdherenceRecord::default()
        };

        let status = decode(PrepStatus::from_code(self.prep_status), "prep_status", self.prep_status)?;
        person.prep = match status {
            PrepStatus::On => PrepRecord::on(
                tick - required(self.time_since_prep_initiation, "time_since_prep_initiation")?,
                tick + required(self.time_until_prep_cessation, "time_until_prep_cessation")?,
            ),
            off => PrepRecord { status: off, ..PrepRecord::default() },
        };

        let mut rec = InfectionRecord { cd4_count: self.cd4_count, ..InfectionRecord::default() };
        if self.infected {
            rec.infected = true;
            rec.time_since_infection = required(self.time_since_infection, "time_since_infection")?;
            rec.time_of_infection = required(self.time_of_infection, "time_of_infection")?;
            rec.age_at_infection = required(self.age_at_infection, "age_at_infection")?;
            rec.dur_inf_by_age = dur_inf_by_age(rec.age_at_infection);
            rec.viral_load = self.viral_load;
            rec.art_status = self.art_status.unwrap_or(false);
            if rec.art_status {
                rec.time_since_art_init = required(self.time_since_art_init, "time_since_art_init")?;
                rec.time_of_art_init = required(self.time_of_art_init, "time_of_art_init")?;
                rec.vl_art_traj_slope = required(self.vl_art_traj_slope, "vl_art_traj_slope")?;
                rec.cd4_at_art_init = required(self.cd4_at_art_init, "cd4_at_art_init")?;
                rec.vl_at_art_init = required(self.vl_at_art_init, "vl_at_art_init")?;
            }
            person.infectivity = self.infectivity;
        }
        person.infection = rec;
        Ok(person)
    }
}

fn decode<T>(value: Option<T>, key: &str, code: u8) -> CoreResult<T> {
    value.ok_or_else(|| CoreError::Parse {
        key:      key.to_string(),
        value:    code.to_string(),
        expected: "a known code",
    })
}

fn required(value: Option<f64>, key: &str) -> CoreResult<f64> {
    value.ok_or_else(|| CoreError::MissingParameter(key.to_string()))
}
