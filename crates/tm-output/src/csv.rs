//! CSV output backend.
//!
//! Creates one file per stream in the configured output directory:
//!
//! | File                     | Rows                                  |
//! |--------------------------|---------------------------------------|
//! | `counts.csv`             | `TickCounts`, one per tick            |
//! | `infection_events.csv`   | [`InfectionRow`]                      |
//! | `death_events.csv`       | [`DeathRow`]                          |
//! | `partnership_events.csv` | [`PartnershipEndRow`]                 |
//! | `person_events.csv`      | [`EventRow`] (tests, ART, PrEP)       |
//! | `biomarkers.csv`         | [`BiomarkerRow`]                      |
//! | `person_data.csv`        | [`PersonDataRow`]                     |
//!
//! Snapshots are written next to them by [`crate::snapshot::write_snapshot`].

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use log::debug;

use tm_sim::{NetworkSnapshot, TickCounts};

use crate::OutputResult;
use crate::row::{
    BiomarkerRow, COUNTS_HEADER, DeathRow, EventRow, InfectionRow, PartnershipEndRow,
    PersonDataRow,
};
use crate::snapshot::write_snapshot;
use crate::writer::OutputWriter;

/// Open `dir/name` and write `header` as its first row.
fn open(dir: &Path, name: &str, header: &[&str]) -> OutputResult<Writer<File>> {
    let mut w = WriterBuilder::new().has_headers(false).from_path(dir.join(name))?;
    w.write_record(header)?;
    Ok(w)
}

/// Writes model output to one CSV file per stream.
pub struct CsvWriter {
    dir:          PathBuf,
    counts:       Writer<File>,
    infections:   Writer<File>,
    deaths:       Writer<File>,
    partnerships: Writer<File>,
    events:       Writer<File>,
    biomarkers:   Writer<File>,
    persons:      Writer<File>,
    finished:     bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        Ok(Self {
            dir:          dir.to_path_buf(),
            counts:       open(dir, "counts.csv", &COUNTS_HEADER)?,
            infections:   open(dir, "infection_events.csv", &InfectionRow::HEADER)?,
            deaths:       open(dir, "death_events.csv", &DeathRow::HEADER)?,
            partnerships: open(dir, "partnership_events.csv", &PartnershipEndRow::HEADER)?,
            events:       open(dir, "person_events.csv", &EventRow::HEADER)?,
            biomarkers:   open(dir, "biomarkers.csv", &BiomarkerRow::HEADER)?,
            persons:      open(dir, "person_data.csv", &PersonDataRow::HEADER)?,
            finished:     false,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputWriter for CsvWriter {
    fn write_counts(&mut self, row: &TickCounts) -> OutputResult<()> {
        self.counts.serialize(row)?;
        Ok(())
    }

    fn write_infection(&mut self, row: &InfectionRow) -> OutputResult<()> {
        self.infections.serialize(row)?;
        Ok(())
    }

    fn write_death(&mut self, row: &DeathRow) -> OutputResult<()> {
        self.deaths.serialize(row)?;
        Ok(())
    }

    fn write_partnership_end(&mut self, row: &PartnershipEndRow) -> OutputResult<()> {
        self.partnerships.serialize(row)?;
        Ok(())
    }

    fn write_event(&mut self, row: &EventRow) -> OutputResult<()> {
        self.events.serialize(row)?;
        Ok(())
    }

    fn write_biomarker(&mut self, row: &BiomarkerRow) -> OutputResult<()> {
        self.biomarkers.serialize(row)?;
        Ok(())
    }

    fn write_person(&mut self, row: &PersonDataRow) -> OutputResult<()> {
        self.persons.serialize(row)?;
        Ok(())
    }

    fn write_snapshot(&mut self, snapshot: &NetworkSnapshot) -> OutputResult<()> {
        let (persons, _) = write_snapshot(&self.dir, snapshot)?;
        debug!("snapshot at tick {} written to {}", snapshot.tick, persons.display());
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.counts.flush()?;
        self.infections.flush()?;
        self.deaths.flush()?;
        self.partnerships.flush()?;
        self.events.flush()?;
        self.biomarkers.flush()?;
        self.persons.flush()?;
        Ok(())
    }
}
