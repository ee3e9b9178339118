//! Plain data row types written by output backends.
//!
//! Every row is flat so that the CSV backend can serialize it directly.  The
//! `HEADER` constant on each type lists the columns in field order.

use serde::Serialize;

use tm_disease::{CauseOfDeath, PartnershipEnd};
use tm_network::EdgeType;
use tm_person::{Person, PrepStatus};
use tm_sim::{InfectionEvent, InfectionSource};

/// Columns of `TickCounts`, in field order.
pub const COUNTS_HEADER: [&str; 24] = [
    "tick", "size", "main_edge_count", "casual_edge_count", "entries", "internal_infected",
    "external_infected", "infected_at_entry", "uninfected", "age_deaths", "infection_deaths",
    "asm_deaths", "overlaps", "sex_acts", "steady_sex_acts", "casual_sex_acts",
    "sd_steady_sex_with_condom", "sd_steady_sex_without_condom", "sc_steady_sex_with_condom",
    "sc_steady_sex_without_condom", "sd_casual_sex_with_condom", "sd_casual_sex_without_condom",
    "sc_casual_sex_with_condom", "sc_casual_sex_without_condom",
];

pub(crate) fn network_name(kind: EdgeType) -> &'static str {
    match kind {
        EdgeType::Steady => "steady",
        EdgeType::Casual => "casual",
    }
}

pub(crate) fn cause_name(cause: CauseOfDeath) -> &'static str {
    match cause {
        CauseOfDeath::None => "none",
        CauseOfDeath::Age => "age",
        CauseOfDeath::Asm => "asm",
        CauseOfDeath::Infection => "infection",
    }
}

pub(crate) fn partnership_end_name(why: PartnershipEnd) -> &'static str {
    match why {
        PartnershipEnd::AgingOut => "aging_out",
        PartnershipEnd::DeathAsm => "death_asm",
        PartnershipEnd::DeathInfection => "death_infection",
    }
}

/// One infection, with the infecting partner's state for network
/// transmissions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfectionRow {
    pub tick:                f64,
    /// `InfectionSource::code`.
    pub source:              u8,
    pub person:              u32,
    pub age:                 f64,
    pub on_prep:             bool,
    pub partner:             Option<u32>,
    pub partner_age:         Option<f64>,
    pub partner_viral_load:  Option<f64>,
    pub partner_cd4:         Option<f64>,
    pub partner_on_art:      Option<bool>,
    pub partner_infectivity: Option<f64>,
    pub network:             Option<&'static str>,
    pub condom_used:         Option<bool>,
}

impl InfectionRow {
    pub const HEADER: [&'static str; 13] = [
        "tick", "source", "person", "age", "on_prep", "partner", "partner_age",
        "partner_viral_load", "partner_cd4", "partner_on_art", "partner_infectivity",
        "network", "condom_used",
    ];

    pub fn from_event(event: &InfectionEvent) -> Self {
        let partner = event.partner.as_ref();
        Self {
            tick:                event.tick,
            source:              event.source.code(),
            person:              event.infected.0,
            age:                 event.age,
            on_prep:             event.on_prep,
            partner:             partner.map(|p| p.id.0),
            partner_age:         partner.map(|p| p.age),
            partner_viral_load:  partner.map(|p| p.viral_load),
            partner_cd4:         partner.map(|p| p.cd4_count),
            partner_on_art:      partner.map(|p| p.on_art),
            partner_infectivity: partner.map(|p| p.infectivity),
            network:             event.network.map(network_name),
            condom_used:         event.condom_used,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeathRow {
    pub tick:     f64,
    pub person:   u32,
    pub age:      f64,
    pub infected: bool,
    pub on_art:   bool,
    pub cause:    &'static str,
}

impl DeathRow {
    pub const HEADER: [&'static str; 6] = ["tick", "person", "age", "infected", "on_art", "cause"];
}

/// A partnership dissolved because one partner died or aged out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnershipEndRow {
    pub tick:    f64,
    pub edge:    u32,
    pub v1:      u32,
    pub v2:      u32,
    pub network: &'static str,
    pub reason:  &'static str,
}

impl PartnershipEndRow {
    pub const HEADER: [&'static str; 6] = ["tick", "edge", "v1", "v2", "network", "reason"];
}

/// Kind of a person-level event in the shared event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Test,
    ArtStart,
    ArtStop,
    PrepStart,
    PrepStop,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Test => "test",
            EventKind::ArtStart => "art_start",
            EventKind::ArtStop => "art_stop",
            EventKind::PrepStart => "prep_start",
            EventKind::PrepStop => "prep_stop",
        }
    }
}

/// A test, ART or PrEP transition.
///
/// `value` is the test result (1 positive, 0 negative) for tests, the
/// `PrepStatus::code` for PrEP transitions and 0 for ART transitions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventRow {
    pub tick:   f64,
    pub person: u32,
    pub kind:   EventKind,
    pub value:  u8,
}

impl EventRow {
    pub const HEADER: [&'static str; 4] = ["tick", "person", "kind", "value"];

    pub fn prep(tick: f64, person: u32, status: PrepStatus) -> Self {
        let kind = match status {
            PrepStatus::On => EventKind::PrepStart,
            _ => EventKind::PrepStop,
        };
        Self { tick, person, kind, value: status.code() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BiomarkerRow {
    pub tick:       f64,
    pub person:     u32,
    pub viral_load: f64,
    pub cd4_count:  f64,
    pub on_art:     bool,
}

impl BiomarkerRow {
    pub const HEADER: [&'static str; 5] = ["tick", "person", "viral_load", "cd4_count", "on_art"];

    pub fn of(tick: f64, person: &Person) -> Self {
        Self {
            tick,
            person:     person.id.0,
            viral_load: person.infection.viral_load,
            cd4_count:  person.infection.cd4_count,
            on_art:     person.is_on_art(),
        }
    }
}

/// Everything that happened to one person over their time in the model.
///
/// Times that never occurred are `None`.  The record is opened when the
/// person enters and written once, when they die or when the run ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonDataRow {
    pub id:                    u32,
    pub entry_tick:            f64,
    pub age_at_entry:          f64,
    pub death_tick:            Option<f64>,
    pub infection_tick:        Option<f64>,
    /// `InfectionSource::code`.
    pub infection_source:      Option<u8>,
    pub art_init_tick:         Option<f64>,
    pub art_stop_tick:         Option<f64>,
    pub prep_init_tick:        Option<f64>,
    pub prep_stop_tick:        Option<f64>,
    /// `PrepStatus::code` at the end of the record.
    pub prep_status:           u8,
    pub infected:              bool,
    pub on_art:                bool,
    pub diagnosed:             bool,
    pub number_of_tests:       u32,
    pub time_since_last_test:  Option<f64>,
    /// `AdherenceCategory::code`.
    pub adherence_category:    u8,
    pub adhered_intervals:     u32,
    pub non_adhered_intervals: u32,
    pub init_art_lag:          Option<f64>,
}

impl PersonDataRow {
    pub const HEADER: [&'static str; 20] = [
        "id", "entry_tick", "age_at_entry", "death_tick", "infection_tick", "infection_source",
        "art_init_tick", "art_stop_tick", "prep_init_tick", "prep_stop_tick", "prep_status",
        "infected", "on_art", "diagnosed", "number_of_tests", "time_since_last_test",
        "adherence_category", "adhered_intervals", "non_adhered_intervals", "init_art_lag",
    ];

    /// Open a record for `person` entering at `tick`.  Persons already
    /// infected or on PrEP at entry carry those times over.
    pub fn open(tick: f64, person: &Person) -> Self {
        let infection = &person.infection;
        Self {
            id:                    person.id.0,
            entry_tick:            tick,
            age_at_entry:          person.age,
            death_tick:            None,
            infection_tick:        infection.infected.then_some(infection.time_of_infection),
            infection_source:      None,
            art_init_tick:         person.is_on_art().then_some(infection.time_of_art_init),
            art_stop_tick:         None,
            prep_init_tick:        person.is_on_prep().then_some(person.prep.start_time),
            prep_stop_tick:        None,
            prep_status:           person.prep.status.code(),
            infected:              infection.infected,
            on_art:                person.is_on_art(),
            diagnosed:             person.diagnosed,
            number_of_tests:       person.diagnoser.test_count,
            time_since_last_test:  None,
            adherence_category:    person.adherence.category.code(),
            adhered_intervals:     person.adherence.adhered_intervals,
            non_adhered_intervals: person.adherence.non_adhered_intervals,
            init_art_lag:          None,
        }
    }

    /// Copy the end-of-record state from `person` at `tick`.
    pub fn close(&mut self, tick: f64, person: &Person) {
        self.prep_status = person.prep.status.code();
        self.infected = person.infection.infected;
        self.on_art = person.is_on_art();
        self.diagnosed = person.diagnosed;
        self.number_of_tests = person.diagnoser.test_count;
        self.time_since_last_test = person.diagnoser.last_test_at.map(|at| tick - at);
        self.adherence_category = person.adherence.category.code();
    }

    pub fn record_infection(&mut self, tick: f64, source: InfectionSource) {
        self.infection_tick = Some(tick);
        self.infection_source = Some(source.code());
    }
}
