//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! one table per stream (`counts`, `infection_events`, `death_events`,
//! `partnership_events`, `person_events`, `biomarkers`, `person_data`) plus
//! `snapshot_persons` and `snapshot_edges` keyed by snapshot tick.

use std::path::Path;

use rusqlite::{Connection, params};

use tm_sim::{NetworkSnapshot, TickCounts};

use crate::OutputResult;
use crate::row::{
    BiomarkerRow, DeathRow, EventRow, InfectionRow, PartnershipEndRow, PersonDataRow, network_name,
};
use crate::writer::OutputWriter;

const SCHEMA: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous  = NORMAL;
    CREATE TABLE IF NOT EXISTS counts (
        tick                         REAL PRIMARY KEY,
        size                         INTEGER NOT NULL,
        main_edge_count              INTEGER NOT NULL,
        casual_edge_count            INTEGER NOT NULL,
        entries                      INTEGER NOT NULL,
        internal_infected            INTEGER NOT NULL,
        external_infected            INTEGER NOT NULL,
        infected_at_entry            INTEGER NOT NULL,
        uninfected                   INTEGER NOT NULL,
        age_deaths                   INTEGER NOT NULL,
        infection_deaths             INTEGER NOT NULL,
        asm_deaths                   INTEGER NOT NULL,
        overlaps                     INTEGER NOT NULL,
        sex_acts                     INTEGER NOT NULL,
        steady_sex_acts              INTEGER NOT NULL,
        casual_sex_acts              INTEGER NOT NULL,
        sd_steady_sex_with_condom    INTEGER NOT NULL,
        sd_steady_sex_without_condom INTEGER NOT NULL,
        sc_steady_sex_with_condom    INTEGER NOT NULL,
        sc_steady_sex_without_condom INTEGER NOT NULL,
        sd_casual_sex_with_condom    INTEGER NOT NULL,
        sd_casual_sex_without_condom INTEGER NOT NULL,
        sc_casual_sex_with_condom    INTEGER NOT NULL,
        sc_casual_sex_without_condom INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS infection_events (
        tick                REAL    NOT NULL,
        source              INTEGER NOT NULL,
        person              INTEGER NOT NULL,
        age                 REAL    NOT NULL,
        on_prep             INTEGER NOT NULL,
        partner             INTEGER,
        partner_age         REAL,
        partner_viral_load  REAL,
        partner_cd4         REAL,
        partner_on_art      INTEGER,
        partner_infectivity REAL,
        network             TEXT,
        condom_used         INTEGER
    );
    CREATE TABLE IF NOT EXISTS death_events (
        tick     REAL    NOT NULL,
        person   INTEGER NOT NULL,
        age      REAL    NOT NULL,
        infected INTEGER NOT NULL,
        on_art   INTEGER NOT NULL,
        cause    TEXT    NOT NULL
    );
    CREATE TABLE IF NOT EXISTS partnership_events (
        tick    REAL    NOT NULL,
        edge    INTEGER NOT NULL,
        v1      INTEGER NOT NULL,
        v2      INTEGER NOT NULL,
        network TEXT    NOT NULL,
        reason  TEXT    NOT NULL
    );
    CREATE TABLE IF NOT EXISTS person_events (
        tick   REAL    NOT NULL,
        person INTEGER NOT NULL,
        kind   TEXT    NOT NULL,
        value  INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS biomarkers (
        tick       REAL    NOT NULL,
        person     INTEGER NOT NULL,
        viral_load REAL    NOT NULL,
        cd4_count  REAL    NOT NULL,
        on_art     INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS person_data (
        id                    INTEGER PRIMARY KEY,
        entry_tick            REAL    NOT NULL,
        age_at_entry          REAL    NOT NULL,
        death_tick            REAL,
        infection_tick        REAL,
        infection_source      INTEGER,
        art_init_tick         REAL,
        art_stop_tick         REAL,
        prep_init_tick        REAL,
        prep_stop_tick        REAL,
        prep_status           INTEGER NOT NULL,
        infected              INTEGER NOT NULL,
        on_art                INTEGER NOT NULL,
        diagnosed             INTEGER NOT NULL,
        number_of_tests       INTEGER NOT NULL,
        time_since_last_test  REAL,
        adherence_category    INTEGER NOT NULL,
        adhered_intervals     INTEGER NOT NULL,
        non_adhered_intervals INTEGER NOT NULL,
        init_art_lag          REAL
    );
    CREATE TABLE IF NOT EXISTS snapshot_persons (
        tick         REAL    NOT NULL,
        vertex_index INTEGER NOT NULL,
        id           INTEGER NOT NULL,
        age          REAL    NOT NULL,
        infected     INTEGER NOT NULL,
        art_status   INTEGER,
        prep_status  INTEGER NOT NULL,
        diagnosed    INTEGER NOT NULL,
        viral_load   REAL    NOT NULL,
        cd4_count    REAL    NOT NULL
    );
    CREATE TABLE IF NOT EXISTS snapshot_edges (
        tick    REAL    NOT NULL,
        v1      INTEGER NOT NULL,
        v2      INTEGER NOT NULL,
        network TEXT    NOT NULL
    );";

/// Writes model output to an SQLite database.
///
/// Snapshot tables hold the headline columns only; use the CSV snapshot
/// files to round-trip a full network.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_counts(&mut self, row: &TickCounts) -> OutputResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO counts VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
              ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)",
        )?;
        stmt.execute(params![
            row.tick,
            row.size as i64,
            row.main_edge_count as i64,
            row.casual_edge_count as i64,
            row.entries,
            row.internal_infected,
            row.external_infected,
            row.infected_at_entry,
            row.uninfected,
            row.age_deaths,
            row.infection_deaths,
            row.asm_deaths,
            row.overlaps,
            row.sex_acts,
            row.steady_sex_acts,
            row.casual_sex_acts,
            row.sd_steady_sex_with_condom,
            row.sd_steady_sex_without_condom,
            row.sc_steady_sex_with_condom,
            row.sc_steady_sex_without_condom,
            row.sd_casual_sex_with_condom,
            row.sd_casual_sex_without_condom,
            row.sc_casual_sex_with_condom,
            row.sc_casual_sex_without_condom,
        ])?;
        Ok(())
    }

    fn write_infection(&mut self, row: &InfectionRow) -> OutputResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO infection_events VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )?;
        stmt.execute(params![
            row.tick,
            row.source,
            row.person,
            row.age,
            row.on_prep,
            row.partner,
            row.partner_age,
            row.partner_viral_load,
            row.partner_cd4,
            row.partner_on_art,
            row.partner_infectivity,
            row.network,
            row.condom_used,
        ])?;
        Ok(())
    }

    fn write_death(&mut self, row: &DeathRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO death_events VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![row.tick, row.person, row.age, row.infected, row.on_art, row.cause],
        )?;
        Ok(())
    }

    fn write_partnership_end(&mut self, row: &PartnershipEndRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO partnership_events VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![row.tick, row.edge, row.v1, row.v2, row.network, row.reason],
        )?;
        Ok(())
    }

    fn write_event(&mut self, row: &EventRow) -> OutputResult<()> {
        let mut stmt = self.conn.prepare_cached("INSERT INTO person_events VALUES (?1, ?2, ?3, ?4)")?;
        stmt.execute(params![row.tick, row.person, row.kind.name(), row.value])?;
        Ok(())
    }

    fn write_biomarker(&mut self, row: &BiomarkerRow) -> OutputResult<()> {
        let mut stmt = self.conn.prepare_cached("INSERT INTO biomarkers VALUES (?1, ?2, ?3, ?4, ?5)")?;
        stmt.execute(params![row.tick, row.person, row.viral_load, row.cd4_count, row.on_art])?;
        Ok(())
    }

    fn write_person(&mut self, row: &PersonDataRow) -> OutputResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO person_data VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
        )?;
        stmt.execute(params![
            row.id,
            row.entry_tick,
            row.age_at_entry,
            row.death_tick,
            row.infection_tick,
            row.infection_source,
            row.art_init_tick,
            row.art_stop_tick,
            row.prep_init_tick,
            row.prep_stop_tick,
            row.prep_status,
            row.infected,
            row.on_art,
            row.diagnosed,
            row.number_of_tests,
            row.time_since_last_test,
            row.adherence_category,
            row.adhered_intervals,
            row.non_adhered_intervals,
            row.init_art_lag,
        ])?;
        Ok(())
    }

    fn write_snapshot(&mut self, snapshot: &NetworkSnapshot) -> OutputResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO snapshot_persons \
                 (tick, vertex_index, id, age, infected, art_status, prep_status, diagnosed, viral_load, cd4_count) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for p in &snapshot.persons {
                stmt.execute(params![
                    snapshot.tick,
                    p.vertex_index,
                    p.id,
                    p.age,
                    p.infected,
                    p.art_status,
                    p.prep_status,
                    p.diagnosed,
                    p.viral_load,
                    p.cd4_count,
                ])?;
            }
            let mut stmt = tx.prepare_cached(
                "INSERT INTO snapshot_edges (tick, v1, v2, network) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for e in &snapshot.edges {
                stmt.execute(params![snapshot.tick, e.v1, e.v2, network_name(e.kind)])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
