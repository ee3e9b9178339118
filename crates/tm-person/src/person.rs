//! The `Person` entity and its state transitions.
//!
//! All mutation that has a domain rule attached goes through a method here
//! (`infect`, `go_on_art`, `go_on_prep`, `go_off_prep`, `diagnose`, `step`).
//! Derived values computed elsewhere (viral load, CD4, infectivity) are
//! written straight into the public fields by the model.

use std::fmt;

use tm_core::{GeometricDistribution, PersonId, SimRng, TimeStep};

use crate::{AdherenceRecord, Diagnoser, InfectionRecord, PrepRecord, PrepStatus, TestResult};

// ── SexualRole ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SexualRole {
    Insertive,
    Receptive,
    Versatile,
}

impl SexualRole {
    pub fn code(self) -> u8 {
        match self {
            SexualRole::Insertive => 0,
            SexualRole::Receptive => 1,
            SexualRole::Versatile => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(SexualRole::Insertive),
            1 => Some(SexualRole::Receptive),
            2 => Some(SexualRole::Versatile),
            _ => None,
        }
    }
}

impl fmt::Display for SexualRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SexualRole::Insertive => "insertive",
            SexualRole::Receptive => "receptive",
            SexualRole::Versatile => "versatile",
        };
        f.write_str(s)
    }
}

// ── TestOutcome ───────────────────────────────────────────────────────────────

/// What happened when a person was offered a test.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TestOutcome {
    pub result:       TestResult,
    /// `true` when a positive result forced the person off PrEP.
    pub prep_stopped: bool,
}

// ── Person ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Person {
    pub id:          PersonId,
    /// Years, fractional.
    pub age:         f64,
    pub circumcised: bool,
    pub steady_role: SexualRole,
    pub casual_role: SexualRole,

    pub infection:   InfectionRecord,
    /// Per-act transmission probability; 0 while uninfected.
    pub infectivity: f64,
    pub prep:        PrepRecord,
    pub adherence:   AdherenceRecord,

    pub diagnoser:   Diagnoser,
    pub diagnosed:   bool,
    /// `false` for non-testers; drawn once at creation.
    pub testable:    bool,
    pub dead:        bool,
}

impl Person {
    pub fn new(
        id: PersonId,
        age: f64,
        circumcised: bool,
        steady_role: SexualRole,
        casual_role: SexualRole,
        diagnoser: Diagnoser,
    ) -> Self {
        Self {
            id,
            age,
            circumcised,
            steady_role,
            casual_role,
            infection: InfectionRecord::default(),
            infectivity: 0.0,
            prep: PrepRecord::default(),
            adherence: AdherenceRecord::default(),
            diagnoser,
            diagnosed: false,
            testable: false,
            dead: false,
        }
    }

    #[inline]
    pub fn is_infected(&self) -> bool {
        self.infection.infected
    }

    #[inline]
    pub fn is_on_art(&self) -> bool {
        self.infection.art_status
    }

    #[inline]
    pub fn is_on_prep(&self) -> bool {
        self.prep.status == PrepStatus::On
    }

    // ── Infection ─────────────────────────────────────────────────────────

    /// Mark infected at `time`, fixing the untreated survival cap.
    pub fn infect(&mut self, duration_of_infection: f64, time: f64) {
        let rec = &mut self.infection;
        rec.infected = true;
        rec.dur_inf_by_age = duration_of_infection;
        rec.time_since_infection = 0.0;
        rec.age_at_infection = self.age;
        rec.time_of_infection = time;
    }

    /// Start ART at `time`, capturing the current CD4 and viral load as the
    /// baseline of the treated trajectories.
    pub fn go_on_art(&mut self, time: f64) {
        let rec = &mut self.infection;
        rec.art_status = true;
        rec.time_since_art_init = 0.0;
        rec.time_of_art_init = time;
        rec.cd4_at_art_init = rec.cd4_count;
        rec.vl_at_art_init = rec.viral_load;
    }

    pub fn go_off_art(&mut self) {
        self.infection.art_status = false;
    }

    // ── PrEP ──────────────────────────────────────────────────────────────

    /// # Panics
    ///
    /// If the person is infected.
    pub fn go_on_prep(&mut self, start_time: f64, stop_time: f64) {
        assert!(
            !self.infection.infected,
            "{}: cannot start PrEP while infected",
            self.id
        );
        self.prep = PrepRecord::on(start_time, stop_time);
    }

    /// # Panics
    ///
    /// If `status` is `PrepStatus::On`; use [`go_on_prep`](Self::go_on_prep).
    pub fn go_off_prep(&mut self, status: PrepStatus) {
        assert!(
            status != PrepStatus::On,
            "{}: go_off_prep requires an off status, got {status}",
            self.id
        );
        self.prep.status = status;
    }

    // ── Testing ───────────────────────────────────────────────────────────

    /// Offer a test at `tick`.  A positive result marks the person
    /// diagnosed and, if on PrEP, moves them to `OffInfected` immediately.
    pub fn diagnose(&mut self, tick: f64, dist: &GeometricDistribution, rng: &mut SimRng) -> TestOutcome {
        let result = self.diagnoser.test(tick, &self.infection, dist, rng);
        self.diagnosed = result == TestResult::Positive;

        let prep_stopped = self.diagnosed && self.is_on_prep();
        if prep_stopped {
            self.prep.status = PrepStatus::OffInfected;
        }
        TestOutcome { result, prep_stopped }
    }

    /// 0 once diagnosed: diagnosed persons leave the testing cycle.
    pub fn time_until_next_test(&self, tick: f64) -> f64 {
        if self.diagnosed { 0.0 } else { self.diagnoser.time_until_next_test(tick) }
    }

    // ── Ageing and mortality checks ───────────────────────────────────────

    /// Advance age by one tick and the infection/ART counters by one tick.
    pub fn step(&mut self, step: TimeStep) {
        self.age += step.years();
        if self.infection.infected {
            self.infection.time_since_infection += 1.0;
        }
        if self.infection.art_status {
            self.infection.time_since_art_init += 1.0;
        }
    }

    pub fn dead_of_age(&self, max_age: f64) -> bool {
        self.age > max_age
    }

    /// Untreated and past the survival cap.
    pub fn dead_of_infection(&self) -> bool {
        let rec = &self.infection;
        rec.infected && !rec.art_status && rec.time_since_infection >= rec.dur_inf_by_age
    }
}
