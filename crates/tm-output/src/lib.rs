//! `tm-output` — output writers for the transmission model.
//!
//! Two backends are provided:
//!
//! | Feature   | Backend | Files created                                             |
//! |-----------|---------|-----------------------------------------------------------|
//! | *(none)*  | CSV     | `counts.csv`, `*_events.csv`, `biomarkers.csv`, `person_data.csv` |
//! | `sqlite`  | SQLite  | `output.db`                                               |
//!
//! Both implement [`OutputWriter`] and are driven by [`OutputRecorder`],
//! which implements `tm_sim::Recorder` and aggregates one
//! [`PersonDataRow`] per person over their life.
//!
//! Network snapshots are written as a pair of CSV files by [`CsvWriter`];
//! [`read_snapshot`] loads them back for `ModelBuilder::snapshot`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tm_output::{CsvWriter, OutputRecorder};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut recorder = OutputRecorder::new(writer);
//! model.run(&mut recorder)?;
//! if let Some(e) = recorder.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod recorder;
pub mod row;
pub mod snapshot;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use recorder::OutputRecorder;
pub use row::{BiomarkerRow, DeathRow, EventKind, EventRow, InfectionRow, PartnershipEndRow, PersonDataRow};
pub use snapshot::{read_snapshot, read_snapshot_from, snapshot_paths, write_snapshot, write_snapshot_to};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
