//! Integration tests for tm-output.

use tm_core::{Parameters, PersonId};
use tm_person::{Diagnoser, Person, SexualRole};
use tm_sim::ModelConfig;

// ── Helpers ───────────────────────────────────────────────────────────────────

const MODEL_PROPS: &str = include_str!("testdata/model.props");

fn config(overrides: &[(&str, &str)]) -> ModelConfig {
    let mut p = Parameters::from_properties_str(MODEL_PROPS).unwrap();
    for (k, v) in overrides {
        p.put(*k, *v);
    }
    ModelConfig::from_parameters(&p).unwrap()
}

/// An untestable, uncircumcised, versatile person.
fn person(id: u32, age: f64) -> Person {
    Person::new(
        PersonId(id),
        age,
        false,
        SexualRole::Versatile,
        SexualRole::Versatile,
        Diagnoser::restore(22.0, 1.0e9, 0),
    )
}

fn infected(id: u32, age: f64, infectivity: f64) -> Person {
    let mut p = person(id, age);
    p.infect(36_500.0, 0.0);
    p.infectivity = infectivity;
    p
}

/// Every act on an edge transmits.
fn certain_transmission() -> [(&'static str, &'static str); 3] {
    [
        ("prop.steady.sex.acts", "1"),
        ("circum.mult", "1"),
        ("inf.part.insertive.mult", "1"),
    ]
}

// ── CSV tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;
    use tm_person::PrepStatus;
    use tm_sim::TickCounts;

    use super::*;
    use crate::csv::CsvWriter;
    use crate::row::{COUNTS_HEADER, EventRow, PersonDataRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn read_all(path: &std::path::Path) -> (csv::StringRecord, Vec<csv::StringRecord>) {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        let headers = rdr.headers().unwrap().clone();
        let rows = rdr.records().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        for name in [
            "counts.csv",
            "infection_events.csv",
            "death_events.csv",
            "partnership_events.csv",
            "person_events.csv",
            "biomarkers.csv",
            "person_data.csv",
        ] {
            assert!(dir.path().join(name).exists(), "{name} missing");
        }
    }

    #[test]
    fn headers_written_before_any_row() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let (headers, rows) = read_all(&dir.path().join("counts.csv"));
        assert!(rows.is_empty());
        assert_eq!(headers.iter().collect::<Vec<_>>(), COUNTS_HEADER.to_vec());

        let (headers, _) = read_all(&dir.path().join("person_data.csv"));
        assert_eq!(headers.iter().collect::<Vec<_>>(), PersonDataRow::HEADER.to_vec());
    }

    #[test]
    fn counts_row_lines_up_with_header() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let counts = TickCounts { tick: 3.0, size: 5, overlaps: -1, casual_sex_acts: 2, ..Default::default() };
        w.write_counts(&counts).unwrap();
        w.finish().unwrap();

        let (headers, rows) = read_all(&dir.path().join("counts.csv"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), headers.len());
        let col = |name: &str| {
            let i = headers.iter().position(|h| h == name).unwrap();
            rows[0][i].to_string()
        };
        assert_eq!(col("tick").parse::<f64>().unwrap(), 3.0);
        assert_eq!(col("size"), "5");
        assert_eq!(col("overlaps"), "-1");
        assert_eq!(col("casual_sex_acts"), "2");
    }

    #[test]
    fn unset_person_times_are_empty() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_person(&PersonDataRow::open(0.0, &person(4, 30.0))).unwrap();
        w.finish().unwrap();

        let (headers, rows) = read_all(&dir.path().join("person_data.csv"));
        let death = headers.iter().position(|h| h == "death_tick").unwrap();
        let infection = headers.iter().position(|h| h == "infection_tick").unwrap();
        assert_eq!(&rows[0][0], "4");
        assert_eq!(&rows[0][death], "");
        assert_eq!(&rows[0][infection], "");
    }

    #[test]
    fn event_kind_written_by_name() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_event(&EventRow::prep(2.0, 4, PrepStatus::OffInfected)).unwrap();
        w.finish().unwrap();

        let (_, rows) = read_all(&dir.path().join("person_events.csv"));
        assert_eq!(&rows[0][1], "4");
        assert_eq!(&rows[0][2], "prep_stop");
        assert_eq!(rows[0][3], PrepStatus::OffInfected.code().to_string());
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

// ── Snapshot files ────────────────────────────────────────────────────────────

#[cfg(test)]
mod snapshot_tests {
    use std::io::{self, Cursor};

    use tm_network::EdgeType;
    use tm_sim::{Model, ModelBuilder};

    use super::*;
    use crate::OutputError;
    use crate::snapshot::{read_snapshot, read_snapshot_from, write_snapshot, write_snapshot_to};

    fn model() -> Model {
        let mut on_prep = person(2, 40.0);
        on_prep.go_on_prep(0.0, 12.5);
        ModelBuilder::new(config(&[]))
            .persons([infected(0, 30.0, 0.01), person(1, 25.0), on_prep])
            .edge(PersonId(0), PersonId(1), EdgeType::Steady)
            .edge(PersonId(1), PersonId(2), EdgeType::Casual)
            .build()
            .unwrap()
    }

    #[test]
    fn written_snapshot_reads_back_unchanged() {
        let snapshot = model().snapshot();
        let mut persons: Vec<u8> = Vec::new();
        let mut edges: Vec<u8> = Vec::new();
        write_snapshot_to(&mut persons, &mut edges, &snapshot).unwrap();

        let back = read_snapshot_from(Cursor::new(persons), Cursor::new(edges), snapshot.tick).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn edges_file_names_the_network() {
        let snapshot = model().snapshot();
        let mut persons: Vec<u8> = Vec::new();
        let mut edges: Vec<u8> = Vec::new();
        write_snapshot_to(&mut persons, &mut edges, &snapshot).unwrap();

        let text = String::from_utf8(edges).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "v1,v2,network");
        assert!(lines.contains(&"1,2,steady"));
        assert!(lines.contains(&"2,3,casual"));
    }

    #[test]
    fn snapshot_files_seed_a_new_model() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = model().snapshot();
        let (persons, edges) = write_snapshot(dir.path(), &snapshot).unwrap();
        assert!(persons.ends_with("network_0_persons.csv"));

        let loaded = read_snapshot(&persons, &edges, 0.0).unwrap();
        let restored = ModelBuilder::new(config(&[])).snapshot(&loaded).build().unwrap();
        assert_eq!(restored.population.len(), 3);
        assert_eq!(restored.network.total_edge_count(), 2);
        assert!(restored.population.get(PersonId(2)).unwrap().is_on_prep());
    }

    fn persons_csv() -> Vec<u8> {
        let mut persons: Vec<u8> = Vec::new();
        write_snapshot_to(&mut persons, io::sink(), &model().snapshot()).unwrap();
        persons
    }

    #[test]
    fn dangling_edge_is_rejected() {
        let edges = "v1,v2,network\n1,9,steady\n";
        let result = read_snapshot_from(Cursor::new(persons_csv()), edges.as_bytes(), 0.0);
        assert!(matches!(result, Err(OutputError::Snapshot(_))));
    }

    #[test]
    fn unknown_network_is_rejected() {
        let edges = "v1,v2,network\n1,2,weekly\n";
        let result = read_snapshot_from(Cursor::new(persons_csv()), edges.as_bytes(), 0.0);
        assert!(matches!(result, Err(OutputError::Snapshot(_))));
    }

    #[test]
    fn malformed_row_is_a_csv_error() {
        let persons = "vertex_index,id\n1,not-a-number\n";
        let result = read_snapshot_from(persons.as_bytes(), "v1,v2,network\n".as_bytes(), 0.0);
        assert!(matches!(result, Err(OutputError::Csv(_))));
    }
}

// ── OutputRecorder ────────────────────────────────────────────────────────────

#[cfg(test)]
mod recorder_tests {
    use std::io;

    use tm_network::EdgeType;
    use tm_person::PrepStatus;
    use tm_sim::{ModelBuilder, NetworkSnapshot, TickCounts};

    use super::*;
    use crate::recorder::OutputRecorder;
    use crate::row::{
        BiomarkerRow, DeathRow, EventKind, EventRow, InfectionRow, PartnershipEndRow, PersonDataRow,
    };
    use crate::writer::OutputWriter;
    use crate::{OutputError, OutputResult};

    /// Keeps every row in memory.
    #[derive(Default)]
    struct MemWriter {
        counts:       Vec<TickCounts>,
        infections:   Vec<InfectionRow>,
        deaths:       Vec<DeathRow>,
        partnerships: Vec<PartnershipEndRow>,
        events:       Vec<EventRow>,
        biomarkers:   Vec<BiomarkerRow>,
        persons:      Vec<PersonDataRow>,
        snapshots:    Vec<NetworkSnapshot>,
        finished:     u32,
    }

    impl MemWriter {
        fn person(&self, id: u32) -> &PersonDataRow {
            self.persons.iter().find(|r| r.id == id).unwrap()
        }

        fn events_of(&self, kind: EventKind) -> Vec<&EventRow> {
            self.events.iter().filter(|e| e.kind == kind).collect()
        }
    }

    impl OutputWriter for MemWriter {
        fn write_counts(&mut self, row: &TickCounts) -> OutputResult<()> {
            self.counts.push(row.clone());
            Ok(())
        }
        fn write_infection(&mut self, row: &InfectionRow) -> OutputResult<()> {
            self.infections.push(row.clone());
            Ok(())
        }
        fn write_death(&mut self, row: &DeathRow) -> OutputResult<()> {
            self.deaths.push(row.clone());
            Ok(())
        }
        fn write_partnership_end(&mut self, row: &PartnershipEndRow) -> OutputResult<()> {
            self.partnerships.push(row.clone());
            Ok(())
        }
        fn write_event(&mut self, row: &EventRow) -> OutputResult<()> {
            self.events.push(*row);
            Ok(())
        }
        fn write_biomarker(&mut self, row: &BiomarkerRow) -> OutputResult<()> {
            self.biomarkers.push(*row);
            Ok(())
        }
        fn write_person(&mut self, row: &PersonDataRow) -> OutputResult<()> {
            self.persons.push(row.clone());
            Ok(())
        }
        fn write_snapshot(&mut self, snapshot: &NetworkSnapshot) -> OutputResult<()> {
            self.snapshots.push(snapshot.clone());
            Ok(())
        }
        fn finish(&mut self) -> OutputResult<()> {
            self.finished += 1;
            Ok(())
        }
    }

    #[test]
    fn transmission_fills_partner_columns() {
        let mut model = ModelBuilder::new(config(&certain_transmission()))
            .persons([infected(0, 30.0, 1.0), person(1, 30.0)])
            .edge(PersonId(0), PersonId(1), EdgeType::Steady)
            .build()
            .unwrap();
        let mut rec = OutputRecorder::new(MemWriter::default());
        model.run_until(1.0, &mut rec).unwrap();

        let data = rec.person_data(PersonId(1)).unwrap();
        assert_eq!(data.infection_tick, Some(1.0));
        assert_eq!(data.infection_source, Some(0));
        // Initially infected persons are recorded at their time of infection.
        assert_eq!(rec.person_data(PersonId(0)).unwrap().infection_tick, Some(0.0));

        let w = rec.into_writer();
        let row = w.infections.last().unwrap();
        assert_eq!(row.person, 1);
        assert_eq!(row.partner, Some(0));
        assert_eq!(row.partner_infectivity, Some(1.0));
        assert_eq!(row.network, Some("steady"));
        assert_eq!(row.condom_used, Some(false));
        assert_eq!(w.counts.len(), 2);
        assert_eq!(w.finished, 0);
    }

    #[test]
    fn death_closes_the_record() {
        let mut model = ModelBuilder::new(config(&[]))
            .persons([person(0, 64.999), person(1, 30.0)])
            .edge(PersonId(0), PersonId(1), EdgeType::Steady)
            .build()
            .unwrap();
        let mut rec = OutputRecorder::new(MemWriter::default());
        model.run(&mut rec).unwrap();

        assert!(rec.take_error().is_none());
        assert!(rec.person_data(PersonId(0)).is_none());
        let w = rec.into_writer();

        assert_eq!(w.deaths.len(), 1);
        assert_eq!(w.deaths[0].cause, "age");
        assert_eq!(w.partnerships.len(), 1);
        assert_eq!(w.partnerships[0].reason, "aging_out");
        assert_eq!(w.partnerships[0].network, "steady");

        assert_eq!(w.persons.len(), 2);
        assert_eq!(w.person(0).death_tick, Some(1.0));
        assert_eq!(w.person(1).death_tick, None);
        assert_eq!(w.finished, 1);
    }

    #[test]
    fn diagnosis_and_art_are_aggregated() {
        let mut p = infected(0, 30.0, 0.01);
        p.infection.time_since_infection = 30.0;
        p.diagnoser = Diagnoser::restore(22.0, 1.0, 0);
        p.testable = true;
        let mut model = ModelBuilder::new(config(&[])).persons([p]).build().unwrap();
        let mut rec = OutputRecorder::new(MemWriter::default());
        model.run(&mut rec).unwrap();
        let w = rec.into_writer();

        let tests = w.events_of(EventKind::Test);
        assert_eq!(tests.len(), 1);
        assert_eq!((tests[0].tick, tests[0].value), (1.0, 1));
        let starts = w.events_of(EventKind::ArtStart);
        assert_eq!(starts.len(), 1);
        assert_eq!(starts[0].tick, 2.0);

        let data = w.person(0);
        assert!(data.diagnosed);
        assert!(data.on_art);
        assert_eq!(data.art_init_tick, Some(2.0));
        assert_eq!(data.init_art_lag, Some(1.0));
        assert_eq!(data.number_of_tests, 1);
        assert_eq!(data.time_since_last_test, Some(9.0));
        assert_ne!(data.adherence_category, 0);
    }

    #[test]
    fn prep_spell_is_recorded() {
        let mut p = person(0, 30.0);
        p.go_on_prep(0.0, 5.5);
        let mut model = ModelBuilder::new(config(&[])).persons([p]).build().unwrap();
        let mut rec = OutputRecorder::new(MemWriter::default());
        model.run(&mut rec).unwrap();
        let w = rec.into_writer();

        assert_eq!(w.events_of(EventKind::PrepStart)[0].tick, 0.0);
        let stops = w.events_of(EventKind::PrepStop);
        assert_eq!(stops.len(), 1);
        assert_eq!((stops[0].tick, stops[0].value), (5.5, PrepStatus::Off.code()));

        let data = w.person(0);
        assert_eq!(data.prep_init_tick, Some(0.0));
        assert_eq!(data.prep_stop_tick, Some(5.5));
        assert_eq!(data.prep_status, PrepStatus::Off.code());
    }

    #[test]
    fn biomarkers_logged_every_tick() {
        let mut model = ModelBuilder::new(config(&[("biomarker.number.of.persons.to.log", "1")]))
            .persons([infected(0, 30.0, 0.01)])
            .build()
            .unwrap();
        let mut rec = OutputRecorder::new(MemWriter::default());
        model.run_until(3.0, &mut rec).unwrap();
        let w = rec.into_writer();

        let ticks: Vec<f64> = w.biomarkers.iter().map(|r| r.tick).collect();
        assert_eq!(ticks, vec![1.0, 2.0, 3.0]);
        assert!(w.biomarkers.iter().all(|r| r.person == 0 && r.cd4_count > 0.0));
    }

    #[test]
    fn snapshots_are_forwarded() {
        let mut model = ModelBuilder::new(config(&[("save.network.at", "4, end")]))
            .persons([person(0, 30.0), person(1, 30.0)])
            .build()
            .unwrap();
        let mut rec = OutputRecorder::new(MemWriter::default());
        model.run(&mut rec).unwrap();
        let w = rec.into_writer();

        let ticks: Vec<f64> = w.snapshots.iter().map(|s| s.tick).collect();
        assert_eq!(ticks, vec![4.0, 10.0]);
    }

    /// Fails every write with the name of the method.
    struct FailingWriter;

    fn fail(what: &str) -> OutputResult<()> {
        Err(OutputError::Io(io::Error::other(what.to_string())))
    }

    impl OutputWriter for FailingWriter {
        fn write_counts(&mut self, _: &TickCounts) -> OutputResult<()> {
            fail("counts")
        }
        fn write_infection(&mut self, _: &InfectionRow) -> OutputResult<()> {
            fail("infection")
        }
        fn write_death(&mut self, _: &DeathRow) -> OutputResult<()> {
            fail("death")
        }
        fn write_partnership_end(&mut self, _: &PartnershipEndRow) -> OutputResult<()> {
            fail("partnership")
        }
        fn write_event(&mut self, _: &EventRow) -> OutputResult<()> {
            fail("event")
        }
        fn write_biomarker(&mut self, _: &BiomarkerRow) -> OutputResult<()> {
            fail("biomarker")
        }
        fn write_person(&mut self, _: &PersonDataRow) -> OutputResult<()> {
            fail("person")
        }
        fn write_snapshot(&mut self, _: &NetworkSnapshot) -> OutputResult<()> {
            fail("snapshot")
        }
        fn finish(&mut self) -> OutputResult<()> {
            fail("finish")
        }
    }

    #[test]
    fn first_write_error_is_kept() {
        let mut model = ModelBuilder::new(config(&[])).persons([person(0, 30.0)]).build().unwrap();
        let mut rec = OutputRecorder::new(FailingWriter);
        model.run(&mut rec).unwrap();

        let err = rec.take_error().expect("an error was stored");
        assert!(err.to_string().contains("counts"), "{err}");
        assert!(rec.take_error().is_none());
    }
}

// ── Whole run to CSV ──────────────────────────────────────────────────────────

#[cfg(test)]
mod integration_tests {
    use tm_network::EdgeType;
    use tm_sim::ModelBuilder;

    use super::*;
    use crate::csv::CsvWriter;
    use crate::recorder::OutputRecorder;
    use crate::snapshot::{read_snapshot, snapshot_paths};

    fn rows(path: &std::path::Path) -> usize {
        csv::Reader::from_path(path).unwrap().records().count()
    }

    #[test]
    fn integration_csv() {
        let mut overrides = certain_transmission().to_vec();
        overrides.push(("save.network.at", "5, end"));
        let mut model = ModelBuilder::new(config(&overrides))
            .persons([infected(0, 30.0, 1.0), person(1, 30.0), person(2, 40.0)])
            .edge(PersonId(0), PersonId(1), EdgeType::Steady)
            .build()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut rec = OutputRecorder::new(CsvWriter::new(dir.path()).unwrap());
        model.run(&mut rec).unwrap();
        assert!(rec.take_error().is_none(), "no write errors expected");

        // Tick 0 plus ticks 1..=10.
        assert_eq!(rows(&dir.path().join("counts.csv")), 11);
        assert_eq!(rows(&dir.path().join("infection_events.csv")), 2);
        assert_eq!(rows(&dir.path().join("person_data.csv")), 3);

        assert!(snapshot_paths(dir.path(), 5.0).0.exists());
        let (persons, edges) = snapshot_paths(dir.path(), 10.0);
        let end = read_snapshot(&persons, &edges, 10.0).unwrap();
        assert_eq!(end, model.snapshot());
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;
    use tm_network::EdgeType;
    use tm_sim::{ModelBuilder, TickCounts};

    use super::*;
    use crate::recorder::OutputRecorder;
    use crate::row::PersonDataRow;
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn open(dir: &TempDir) -> rusqlite::Connection {
        rusqlite::Connection::open(dir.path().join("output.db")).unwrap()
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_counts() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_counts(&TickCounts { tick: 7.0, size: 42, overlaps: -1, ..Default::default() }).unwrap();
        w.finish().unwrap();

        let (size, overlaps): (i64, i64) = open(&dir)
            .query_row("SELECT size, overlaps FROM counts WHERE tick = 7.0", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(size, 42);
        assert_eq!(overlaps, -1);
    }

    #[test]
    fn sqlite_unset_times_are_null() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_person(&PersonDataRow::open(0.0, &person(3, 30.0))).unwrap();
        w.finish().unwrap();

        let death: Option<f64> = open(&dir)
            .query_row("SELECT death_tick FROM person_data WHERE id = 3", [], |r| r.get(0))
            .unwrap();
        assert_eq!(death, None);
    }

    #[test]
    fn sqlite_whole_run() {
        let mut overrides = certain_transmission().to_vec();
        overrides.push(("save.network.at", "end"));
        let mut model = ModelBuilder::new(config(&overrides))
            .persons([infected(0, 30.0, 1.0), person(1, 30.0)])
            .edge(PersonId(0), PersonId(1), EdgeType::Steady)
            .build()
            .unwrap();

        let dir = tmp();
        let mut rec = OutputRecorder::new(SqliteWriter::new(dir.path()).unwrap());
        model.run(&mut rec).unwrap();
        assert!(rec.take_error().is_none());

        let conn = open(&dir);
        let count = |sql: &str| -> i64 { conn.query_row(sql, [], |r| r.get(0)).unwrap() };
        assert_eq!(count("SELECT COUNT(*) FROM counts"), 11);
        assert_eq!(count("SELECT COUNT(*) FROM infection_events WHERE partner = 0"), 1);
        assert_eq!(count("SELECT COUNT(*) FROM person_data"), 2);
        assert_eq!(count("SELECT COUNT(*) FROM snapshot_persons WHERE tick = 10.0"), 2);
        assert_eq!(count("SELECT COUNT(*) FROM snapshot_edges WHERE network = 'steady'"), 1);
    }
}
