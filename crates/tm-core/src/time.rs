//! Simulation time model.
//!
//! # Design
//!
//! The model steps once per whole tick (`1.0`, `2.0`, …), but other actions
//! are deliberately placed between steps: ART initiation fires at
//! `initiation_tick - 0.1` so it lands before that tick's step, while PrEP
//! cessation and snapshots fire at `tick + 0.1`, after it.  `Tick` is
//! therefore a real number with a *total* order (`f64::total_cmp`) so it can
//! key a `BTreeMap` directly.
//!
//! One tick represents `TimeStep::days` simulated days (the original model
//! runs with 1).

use std::cmp::Ordering;
use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation time, in ticks.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub f64);

impl Tick {
    pub const ZERO: Tick = Tick(0.0);

    /// Whole tick this time falls in (`3.9 → 3`).
    #[inline]
    pub fn whole(self) -> i64 {
        self.0.floor() as i64
    }

    /// Ticks elapsed from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> f64 {
        self.0 - earlier.0
    }
}

impl PartialEq for Tick {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Tick {}

impl PartialOrd for Tick {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tick {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::ops::Add<f64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: f64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub<f64> for Tick {
    type Output = Tick;
    #[inline]
    fn sub(self, rhs: f64) -> Tick {
        Tick(self.0 - rhs)
    }
}

impl From<f64> for Tick {
    fn from(t: f64) -> Self {
        Tick(t)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── TimeStep ─────────────────────────────────────────────────────────────────

/// How much simulated time one tick represents.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeStep {
    /// Days per tick (`size.of.timestep`).
    pub days: f64,
}

impl TimeStep {
    pub const DAYS_PER_YEAR: f64 = 365.0;

    pub fn new(days: f64) -> Self {
        Self { days }
    }

    /// Fraction of a year covered by one tick; the amount a person ages per step.
    #[inline]
    pub fn years(self) -> f64 {
        self.days / Self::DAYS_PER_YEAR
    }

    /// Convert a duration in days into ticks.
    #[inline]
    pub fn ticks_for_days(self, days: f64) -> f64 {
        days / self.days
    }

    /// Convert a tick count into years.
    #[inline]
    pub fn ticks_to_years(self, ticks: f64) -> f64 {
        ticks * self.years()
    }
}

impl Default for TimeStep {
    fn default() -> Self {
        Self { days: 1.0 }
    }
}
