//! Network snapshot files.
//!
//! A snapshot is stored as two CSV files side by side:
//!
//! ```text
//! network_<tick>_persons.csv   one row per person, PersonSnapshot columns
//! network_<tick>_edges.csv     v1,v2,network
//! ```
//!
//! ```csv
//! v1,v2,network
//! 1,2,steady
//! 1,3,casual
//! ```
//!
//! `v1`/`v2` are the persons' `vertex_index` values, not their ids.  A
//! snapshot read back from these files is checked before it is returned:
//! vertex indices must be unique and every edge must name two of them.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use tm_network::EdgeType;
use tm_person::PersonSnapshot;
use tm_sim::{EdgeSnapshot, NetworkSnapshot, SimError};

use crate::OutputResult;
use crate::row::network_name;

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct EdgeRecord {
    v1:      u32,
    v2:      u32,
    network: String,
}

fn parse_network(name: &str) -> Option<EdgeType> {
    match name {
        "steady" => Some(EdgeType::Steady),
        "casual" => Some(EdgeType::Casual),
        _ => None,
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Paths of the persons and edges files for a snapshot taken at `tick`.
pub fn snapshot_paths(dir: &Path, tick: f64) -> (PathBuf, PathBuf) {
    let tick = tick as i64;
    (
        dir.join(format!("network_{tick}_persons.csv")),
        dir.join(format!("network_{tick}_edges.csv")),
    )
}

/// Write `snapshot` into `dir` and return the two paths written.
pub fn write_snapshot(dir: &Path, snapshot: &NetworkSnapshot) -> OutputResult<(PathBuf, PathBuf)> {
    let (persons, edges) = snapshot_paths(dir, snapshot.tick);
    write_snapshot_to(File::create(&persons)?, File::create(&edges)?, snapshot)?;
    Ok((persons, edges))
}

/// Like [`write_snapshot`] but into any pair of `Write` sinks.
pub fn write_snapshot_to<P: Write, E: Write>(
    persons: P,
    edges: E,
    snapshot: &NetworkSnapshot,
) -> OutputResult<()> {
    let mut persons = csv::Writer::from_writer(persons);
    for p in &snapshot.persons {
        persons.serialize(p)?;
    }
    persons.flush()?;

    let mut edges = csv::Writer::from_writer(edges);
    edges.write_record(["v1", "v2", "network"])?;
    for e in &snapshot.edges {
        edges.write_record(&[e.v1.to_string(), e.v2.to_string(), network_name(e.kind).to_string()])?;
    }
    edges.flush()?;
    Ok(())
}

/// Read a snapshot taken at `tick` from its two files.
pub fn read_snapshot(persons: &Path, edges: &Path, tick: f64) -> OutputResult<NetworkSnapshot> {
    read_snapshot_from(File::open(persons)?, File::open(edges)?, tick)
}

/// Like [`read_snapshot`] but accepts any `Read` sources.
///
/// Useful for testing (pass a `std::io::Cursor`).
pub fn read_snapshot_from<P: Read, E: Read>(
    persons: P,
    edges: E,
    tick: f64,
) -> OutputResult<NetworkSnapshot> {
    let persons = csv::Reader::from_reader(persons)
        .deserialize::<PersonSnapshot>()
        .collect::<Result<Vec<_>, _>>()?;

    let mut edge_rows = Vec::new();
    for record in csv::Reader::from_reader(edges).deserialize::<EdgeRecord>() {
        let record = record?;
        let kind = parse_network(&record.network).ok_or_else(|| {
            SimError::Config(format!("unknown network type '{}'", record.network))
        })?;
        edge_rows.push(EdgeSnapshot { v1: record.v1, v2: record.v2, kind });
    }

    let snapshot = NetworkSnapshot { tick, persons, edges: edge_rows };
    let index = snapshot.index_map()?;
    if let Some(e) = snapshot.edges.iter().find(|e| !index.contains_key(&e.v1) || !index.contains_key(&e.v2)) {
        return Err(SimError::Config(format!(
            "edge {}-{} refers to a vertex index with no person",
            e.v1, e.v2
        ))
        .into());
    }
    Ok(snapshot)
}
