//! Recorder trait for event logging and data collection.

use tm_core::PersonId;
use tm_disease::{CauseOfDeath, PartnershipEnd};
use tm_network::{Edge, EdgeType};
use tm_person::{Person, PrepStatus};

use crate::{NetworkSnapshot, TickCounts};

/// Where an infection came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InfectionSource {
    /// Transmission across a network edge, or infected in the initial
    /// population.
    Internal,
    /// Contact outside the modeled network.
    External,
    /// Already infected on entering the population.
    Entry,
}

impl InfectionSource {
    pub fn code(self) -> u8 {
        match self {
            InfectionSource::Internal => 0,
            InfectionSource::External => 1,
            InfectionSource::Entry => 2,
        }
    }
}

/// State of the infecting partner at the moment of transmission.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PartnerState {
    pub id:          PersonId,
    pub age:         f64,
    pub viral_load:  f64,
    pub cd4_count:   f64,
    pub on_art:      bool,
    pub infectivity: f64,
}

impl PartnerState {
    pub fn of(person: &Person) -> Self {
        Self {
            id:          person.id,
            age:         person.age,
            viral_load:  person.infection.viral_load,
            cd4_count:   person.infection.cd4_count,
            on_art:      person.is_on_art(),
            infectivity: person.infectivity,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InfectionEvent {
    pub tick:        f64,
    pub source:      InfectionSource,
    pub infected:    PersonId,
    pub age:         f64,
    pub on_prep:     bool,
    /// Set for network transmissions only.
    pub partner:     Option<PartnerState>,
    pub network:     Option<EdgeType>,
    pub condom_used: Option<bool>,
}

impl InfectionEvent {
    /// An infection without a known partner.
    pub fn unlinked(tick: f64, person: &Person, source: InfectionSource) -> Self {
        Self {
            tick,
            source,
            infected: person.id,
            age: person.age,
            on_prep: person.is_on_prep(),
            partner: None,
            network: None,
            condom_used: None,
        }
    }
}

/// Callbacks invoked by the [`Model`][crate::Model] as events happen.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  The model never reads anything back,
/// so a recorder cannot change the course of a run.
pub trait Recorder {
    /// A person joined the population: at construction (tick 0) or as an
    /// entry during a tick.
    fn person_entered(&mut self, _tick: f64, _person: &Person) {}

    fn infection(&mut self, _event: &InfectionEvent) {}

    /// `person` died at `tick`; they are still in the population while this
    /// runs.
    fn death(&mut self, _tick: f64, _person: &Person, _cause: CauseOfDeath) {}

    fn partnership_ended(&mut self, _tick: f64, _edge: &Edge, _why: PartnershipEnd) {}

    /// A test was performed; `positive` is the result.
    fn test(&mut self, _tick: f64, _person: &Person, _positive: bool) {}

    /// Lag from diagnosis to ART initiation, in ticks.
    fn art_lag(&mut self, _person: PersonId, _lag: f64) {}

    /// ART started (`on = true`) or stopped.
    fn art(&mut self, _tick: f64, _person: &Person, _on: bool) {}

    /// PrEP started (`PrepStatus::On`) or stopped for the given reason.
    fn prep(&mut self, _tick: f64, _person: PersonId, _status: PrepStatus) {}

    /// Outcome of one adherence window.
    fn adherence_interval(&mut self, _person: PersonId, _adhered: bool) {}

    /// Per-tick vitals for a person in the biomarker sample.
    fn biomarker(&mut self, _tick: f64, _person: &Person) {}

    fn tick_counts(&mut self, _counts: &TickCounts) {}

    fn snapshot(&mut self, _snapshot: &NetworkSnapshot) {}

    /// Called once per living person at the end of the run.
    fn person_finalized(&mut self, _tick: f64, _person: &Person) {}

    /// Called once after the run completes.
    fn run_end(&mut self, _tick: f64) {}
}

/// A [`Recorder`] that does nothing.
pub struct NoopRecorder;

impl Recorder for NoopRecorder {}
