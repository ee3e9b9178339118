//! `EventQueue` — tick-ordered queue of pending actions.
//!
//! `BTreeMap` keyed by `Tick` gives O(log W) push and pop, W being the
//! number of distinct pending ticks.  Within a tick the queue is FIFO, which
//! is what keeps a run reproducible: two actions at the same time always
//! fire in the order they were scheduled.

use std::collections::{BTreeMap, VecDeque};

use tm_core::Tick;

#[derive(Debug)]
pub struct EventQueue<E> {
    inner: BTreeMap<Tick, VecDeque<E>>,
    /// Cached event count for O(1) `len()`.
    total: usize,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self { inner: BTreeMap::new(), total: 0 }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` at `tick`, after anything already queued there.
    pub fn push(&mut self, tick: Tick, event: E) {
        self.inner.entry(tick).or_default().push_back(event);
        self.total += 1;
    }

    /// Remove and return the earliest event.
    pub fn pop_next(&mut self) -> Option<(Tick, E)> {
        let mut entry = self.inner.first_entry()?;
        let tick = *entry.key();
        let event = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        self.total -= 1;
        event.map(|e| (tick, e))
    }

    /// The earliest tick with a pending event.
    pub fn next_tick(&self) -> Option<Tick> {
        self.inner.keys().next().copied()
    }

    /// Drop every event at `tick` for which `pred` holds.  Returns how many
    /// were dropped.
    pub fn cancel<F>(&mut self, tick: Tick, mut pred: F) -> usize
    where
        F: FnMut(&E) -> bool,
    {
        let Some(events) = self.inner.get_mut(&tick) else {
            return 0;
        };
        let before = events.len();
        events.retain(|e| !pred(e));
        let dropped = before - events.len();
        if events.is_empty() {
            self.inner.remove(&tick);
        }
        self.total -= dropped;
        dropped
    }

    /// Events pending at exactly `tick`, in firing order.
    pub fn events_at(&self, tick: Tick) -> impl Iterator<Item = &E> {
        self.inner.get(&tick).into_iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct ticks with at least one pending event.
    pub fn tick_count(&self) -> usize {
        self.inner.len()
    }
}
