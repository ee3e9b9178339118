//! Per-person HIV testing schedule.
//!
//! A person tests when the current tick reaches `next_test_at`.  Each test
//! samples the delay to the following one from the shared inter-test
//! distribution (geometric on the daily testing probability, offset 1), so a
//! tester never tests twice in the same tick.
//!
//! A test is positive only if the person is infected *and* past the
//! detection window; an infection younger than the window tests negative.

use tm_core::{GeometricDistribution, SimRng};

use crate::InfectionRecord;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TestResult {
    /// Not due for a test this tick.
    NoTest,
    Positive,
    Negative,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Diagnoser {
    /// Ticks after infection before a test can detect it.
    pub detection_window: f64,
    pub next_test_at:     f64,
    pub last_test_at:     Option<f64>,
    pub test_count:       u32,
}

impl Diagnoser {
    /// A fresh schedule whose first test falls one sampled interval after `tick`.
    pub fn new(tick: f64, detection_window: f64, dist: &GeometricDistribution, rng: &mut SimRng) -> Self {
        Self {
            detection_window,
            next_test_at: tick + dist.next(rng),
            last_test_at: None,
            test_count: 0,
        }
    }

    /// A schedule restored from exported state.
    pub fn restore(detection_window: f64, next_test_at: f64, test_count: u32) -> Self {
        Self { detection_window, next_test_at, last_test_at: None, test_count }
    }

    /// Test if due.  Draws from `rng` only when a test actually happens.
    pub fn test(
        &mut self,
        tick: f64,
        infection: &InfectionRecord,
        dist: &GeometricDistribution,
        rng: &mut SimRng,
    ) -> TestResult {
        if tick < self.next_test_at {
            return TestResult::NoTest;
        }
        self.test_count += 1;
        self.last_test_at = Some(tick);
        self.next_test_at = tick + dist.next(rng);

        if infection.infected && infection.time_since_infection > self.detection_window {
            TestResult::Positive
        } else {
            TestResult::Negative
        }
    }

    pub fn time_until_next_test(&self, tick: f64) -> f64 {
        self.next_test_at - tick
    }
}
