//! The `OutputWriter` trait implemented by all backend writers.

use tm_sim::{NetworkSnapshot, TickCounts};

use crate::OutputResult;
use crate::row::{BiomarkerRow, DeathRow, EventRow, InfectionRow, PartnershipEndRow, PersonDataRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// All methods are infallible from the recorder's perspective: errors are
/// stored and retrieved with [`OutputRecorder::take_error`].
///
/// [`OutputRecorder::take_error`]: crate::OutputRecorder::take_error
pub trait OutputWriter {
    /// Write the counts of one tick.
    fn write_counts(&mut self, row: &TickCounts) -> OutputResult<()>;

    fn write_infection(&mut self, row: &InfectionRow) -> OutputResult<()>;

    fn write_death(&mut self, row: &DeathRow) -> OutputResult<()>;

    fn write_partnership_end(&mut self, row: &PartnershipEndRow) -> OutputResult<()>;

    /// Write a test, ART or PrEP transition.
    fn write_event(&mut self, row: &EventRow) -> OutputResult<()>;

    fn write_biomarker(&mut self, row: &BiomarkerRow) -> OutputResult<()>;

    /// Write a closed per-person record.
    fn write_person(&mut self, row: &PersonDataRow) -> OutputResult<()>;

    /// Write a whole-network snapshot.
    fn write_snapshot(&mut self, snapshot: &NetworkSnapshot) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
