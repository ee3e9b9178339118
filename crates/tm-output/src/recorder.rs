//! `OutputRecorder<W>`: bridges `tm_sim::Recorder` to an `OutputWriter`.

use std::collections::BTreeMap;

use log::warn;

use tm_core::PersonId;
use tm_disease::{CauseOfDeath, PartnershipEnd};
use tm_network::Edge;
use tm_person::{Person, PrepStatus};
use tm_sim::{InfectionEvent, NetworkSnapshot, Recorder, TickCounts};

use crate::row::{
    BiomarkerRow, DeathRow, EventKind, EventRow, InfectionRow, PartnershipEndRow, PersonDataRow,
    cause_name, network_name, partnership_end_name,
};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`Recorder`] that streams events to any [`OutputWriter`] backend and
/// keeps one open [`PersonDataRow`] per living person.
///
/// A person's record is written when they die, or at the end of the run for
/// those still alive.  Errors from the writer are stored because `Recorder`
/// methods have no return value.  After `model.run()` returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct OutputRecorder<W: OutputWriter> {
    writer:     W,
    open:       BTreeMap<PersonId, PersonDataRow>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> OutputRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, open: BTreeMap::new(), last_error: None }
    }

    /// Take the stored write error (if any) after the run.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// The record still open for `person`, if they are alive.
    pub fn person_data(&self, person: PersonId) -> Option<&PersonDataRow> {
        self.open.get(&person)
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }

    fn event(&mut self, tick: f64, person: PersonId, kind: EventKind, value: u8) {
        let result = self.writer.write_event(&EventRow { tick, person: person.0, kind, value });
        self.store_err(result);
    }

    /// Close and write the record of `person`.
    fn close(&mut self, tick: f64, person: &Person, died: bool) {
        let Some(mut row) = self.open.remove(&person.id) else {
            warn!("no open record for {}", person.id);
            return;
        };
        row.close(tick, person);
        if died {
            row.death_tick = Some(tick);
        }
        let result = self.writer.write_person(&row);
        self.store_err(result);
    }
}

impl<W: OutputWriter> Recorder for OutputRecorder<W> {
    fn person_entered(&mut self, tick: f64, person: &Person) {
        self.open.insert(person.id, PersonDataRow::open(tick, person));
    }

    fn infection(&mut self, event: &InfectionEvent) {
        if let Some(row) = self.open.get_mut(&event.infected) {
            row.record_infection(event.tick, event.source);
        }
        let result = self.writer.write_infection(&InfectionRow::from_event(event));
        self.store_err(result);
    }

    fn death(&mut self, tick: f64, person: &Person, cause: CauseOfDeath) {
        let row = DeathRow {
            tick,
            person:   person.id.0,
            age:      person.age,
            infected: person.infection.infected,
            on_art:   person.is_on_art(),
            cause:    cause_name(cause),
        };
        let result = self.writer.write_death(&row);
        self.store_err(result);
        self.close(tick, person, true);
    }

    fn partnership_ended(&mut self, tick: f64, edge: &Edge, why: PartnershipEnd) {
        let row = PartnershipEndRow {
            tick,
            edge:    edge.id.0,
            v1:      edge.v1.0,
            v2:      edge.v2.0,
            network: network_name(edge.kind),
            reason:  partnership_end_name(why),
        };
        let result = self.writer.write_partnership_end(&row);
        self.store_err(result);
    }

    fn test(&mut self, tick: f64, person: &Person, positive: bool) {
        self.event(tick, person.id, EventKind::Test, positive as u8);
    }

    fn art_lag(&mut self, person: PersonId, lag: f64) {
        if let Some(row) = self.open.get_mut(&person) {
            row.init_art_lag.get_or_insert(lag);
        }
    }

    fn art(&mut self, tick: f64, person: &Person, on: bool) {
        if let Some(row) = self.open.get_mut(&person.id) {
            if on {
                row.art_init_tick = Some(tick);
            } else {
                row.art_stop_tick = Some(tick);
            }
        }
        let kind = if on { EventKind::ArtStart } else { EventKind::ArtStop };
        self.event(tick, person.id, kind, 0);
    }

    fn prep(&mut self, tick: f64, person: PersonId, status: PrepStatus) {
        if let Some(row) = self.open.get_mut(&person) {
            row.prep_status = status.code();
            match status {
                PrepStatus::On => row.prep_init_tick = Some(tick),
                _ => row.prep_stop_tick = Some(tick),
            }
        }
        let result = self.writer.write_event(&EventRow::prep(tick, person.0, status));
        self.store_err(result);
    }

    fn adherence_interval(&mut self, person: PersonId, adhered: bool) {
        if let Some(row) = self.open.get_mut(&person) {
            if adhered {
                row.adhered_intervals += 1;
            } else {
                row.non_adhered_intervals += 1;
            }
        }
    }

    fn biomarker(&mut self, tick: f64, person: &Person) {
        let result = self.writer.write_biomarker(&BiomarkerRow::of(tick, person));
        self.store_err(result);
    }

    fn tick_counts(&mut self, counts: &TickCounts) {
        let result = self.writer.write_counts(counts);
        self.store_err(result);
    }

    fn snapshot(&mut self, snapshot: &NetworkSnapshot) {
        let result = self.writer.write_snapshot(snapshot);
        self.store_err(result);
    }

    fn person_finalized(&mut self, tick: f64, person: &Person) {
        self.close(tick, person, false);
    }

    fn run_end(&mut self, _tick: f64) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
