//! Whole-network snapshot: every living person plus every edge.
//!
//! Persons get a 1-based export index in ascending id order; edges refer to
//! their endpoints by that index, so a snapshot is self-contained and can be
//! written out and read back without the ids lining up with anything.

use std::collections::BTreeMap;

use tm_network::{ContactNetwork, EdgeType};
use tm_person::{PersonSnapshot, Population};

use crate::{SimError, SimResult};

/// One edge by export index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeSnapshot {
    pub v1:   u32,
    pub v2:   u32,
    pub kind: EdgeType,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkSnapshot {
    /// Whole tick the snapshot was taken at.
    pub tick:    f64,
    pub persons: Vec<PersonSnapshot>,
    pub edges:   Vec<EdgeSnapshot>,
}

impl NetworkSnapshot {
    pub fn capture(tick: f64, population: &Population, network: &ContactNetwork) -> Self {
        let mut index = BTreeMap::new();
        let persons: Vec<PersonSnapshot> = population
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let vertex_index = i as u32 + 1;
                index.insert(p.id, vertex_index);
                PersonSnapshot::capture(p, vertex_index, tick)
            })
            .collect();

        let edges = network
            .edges()
            .filter_map(|e| {
                Some(EdgeSnapshot { v1: *index.get(&e.v1)?, v2: *index.get(&e.v2)?, kind: e.kind })
            })
            .collect();

        Self { tick, persons, edges }
    }

    pub fn edges_of_type(&self, kind: EdgeType) -> impl Iterator<Item = &EdgeSnapshot> + '_ {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    /// Map from export index to position in `persons`.  Fails on a repeated
    /// index.
    pub fn index_map(&self) -> SimResult<BTreeMap<u32, usize>> {
        let mut map = BTreeMap::new();
        for (pos, p) in self.persons.iter().enumerate() {
            if map.insert(p.vertex_index, pos).is_some() {
                return Err(SimError::Config(format!(
                    "snapshot vertex index {} appears twice",
                    p.vertex_index
                )));
            }
        }
        Ok(map)
    }
}
