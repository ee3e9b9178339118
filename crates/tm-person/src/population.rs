//! Id-indexed person storage.
//!
//! # Layout
//!
//! `slots[id.index()]` holds the person with that id, or `None` once they
//! have been removed.  Ids are never reused, so a removed slot stays a
//! tombstone for the rest of the run and iteration order (ascending id)
//! equals creation order.
//!
//! ```ignore
//! let p = population.get(PersonId(3))?;   // O(1)
//! for p in population.iter() { … }        // live persons, ascending id
//! ```
//!
//! Removal during a pass is done by collecting ids first and removing after
//! the pass; the arena itself never shifts elements.

use tm_core::PersonId;

use crate::Person;

#[derive(Clone, Debug, Default)]
pub struct Population {
    slots: Vec<Option<Person>>,
    live:  usize,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of living persons.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Insert `person` at the slot of its id.
    ///
    /// # Panics
    ///
    /// If a living person already occupies that id.
    pub fn insert(&mut self, person: Person) {
        let idx = person.id.index();
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        assert!(self.slots[idx].is_none(), "{} inserted twice", person.id);
        self.slots[idx] = Some(person);
        self.live += 1;
    }

    /// Remove and return a person, leaving a tombstone.
    pub fn remove(&mut self, id: PersonId) -> Option<Person> {
        let removed = self.slots.get_mut(id.index()).and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    #[inline]
    pub fn contains(&self, id: PersonId) -> bool {
        self.get(id).is_some()
    }

    #[inline]
    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, id: PersonId) -> Option<&mut Person> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Living persons in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Person> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Person> + '_ {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    /// Snapshot of the living ids, ascending.
    pub fn ids(&self) -> Vec<PersonId> {
        self.iter().map(|p| p.id).collect()
    }

    /// One past the largest id ever inserted.
    pub fn id_bound(&self) -> usize {
        self.slots.len()
    }
}
