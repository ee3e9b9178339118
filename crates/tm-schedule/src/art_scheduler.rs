//! Batching of ART initiations by tick.
//!
//! Every person diagnosed positive is given an initiation tick (diagnosis
//! tick plus a sampled lag).  Persons that land on the same tick share one
//! queued action: the first `add` for a tick reports that the action needs
//! scheduling, later ones just join the batch.

use std::collections::BTreeMap;

use tm_core::{PersonId, Tick};

#[derive(Debug, Default)]
pub struct ArtScheduler {
    batches: BTreeMap<Tick, Vec<PersonId>>,
}

impl ArtScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `person` to the batch firing at `tick`.  Returns `true` if this
    /// created the batch, in which case the caller must queue the action.
    pub fn add(&mut self, tick: Tick, person: PersonId) -> bool {
        let mut created = false;
        self.batches
            .entry(tick)
            .or_insert_with(|| {
                created = true;
                Vec::new()
            })
            .push(person);
        created
    }

    /// Remove and return the batch for `tick`, in insertion order.  Empty if
    /// there is none.
    pub fn take(&mut self, tick: Tick) -> Vec<PersonId> {
        self.batches.remove(&tick).unwrap_or_default()
    }

    pub fn batch(&self, tick: Tick) -> &[PersonId] {
        self.batches.get(&tick).map_or(&[], Vec::as_slice)
    }

    /// Number of pending batches.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}
