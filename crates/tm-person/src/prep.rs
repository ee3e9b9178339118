//! Pre-exposure prophylaxis state.

use std::fmt;

/// PrEP status.  The three "off" variants record why a person is off.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrepStatus {
    /// Never started, or stopped at the scheduled cessation time.
    #[default]
    Off,
    On,
    /// Stopped because a test came back positive.
    OffInfected,
    /// Stopped for any other reason (death while on PrEP).
    OffOther,
}

impl PrepStatus {
    /// Stable integer code used in event output.
    pub fn code(self) -> u8 {
        match self {
            PrepStatus::Off => 0,
            PrepStatus::On => 1,
            PrepStatus::OffInfected => 2,
            PrepStatus::OffOther => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(PrepStatus::Off),
            1 => Some(PrepStatus::On),
            2 => Some(PrepStatus::OffInfected),
            3 => Some(PrepStatus::OffOther),
            _ => None,
        }
    }
}

impl fmt::Display for PrepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrepStatus::Off => "off",
            PrepStatus::On => "on",
            PrepStatus::OffInfected => "off_infected",
            PrepStatus::OffOther => "off_other",
        };
        f.write_str(s)
    }
}

/// Current PrEP status plus the start and (sampled) stop time of the most
/// recent PrEP spell.  `stop_time` is fixed when the spell starts.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PrepRecord {
    pub status:     PrepStatus,
    pub start_time: f64,
    pub stop_time:  f64,
}

impl PrepRecord {
    pub fn on(start_time: f64, stop_time: f64) -> Self {
        Self { status: PrepStatus::On, start_time, stop_time }
    }
}
