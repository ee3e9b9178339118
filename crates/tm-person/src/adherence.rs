//! ART adherence category and interval counters.

use std::fmt;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdherenceCategory {
    /// Not yet assigned (never started ART).
    #[default]
    Na,
    Never,
    Always,
    PartialPos,
    PartialNeg,
}

impl AdherenceCategory {
    pub fn code(self) -> u8 {
        match self {
            AdherenceCategory::Na => 0,
            AdherenceCategory::Never => 1,
            AdherenceCategory::Always => 2,
            AdherenceCategory::PartialPos => 3,
            AdherenceCategory::PartialNeg => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(AdherenceCategory::Na),
            1 => Some(AdherenceCategory::Never),
            2 => Some(AdherenceCategory::Always),
            3 => Some(AdherenceCategory::PartialPos),
            4 => Some(AdherenceCategory::PartialNeg),
            _ => None,
        }
    }
}

impl fmt::Display for AdherenceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdherenceCategory::Na => "na",
            AdherenceCategory::Never => "never",
            AdherenceCategory::Always => "always",
            AdherenceCategory::PartialPos => "partial_pos",
            AdherenceCategory::PartialNeg => "partial_neg",
        };
        f.write_str(s)
    }
}

/// Assigned once, the first time a person starts ART.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AdherenceRecord {
    pub category:              AdherenceCategory,
    /// Chance of adhering over one adherence window.
    pub probability:           f64,
    pub adhered_intervals:     u32,
    pub non_adhered_intervals: u32,
}

impl AdherenceRecord {
    pub fn is_assigned(&self) -> bool {
        self.category != AdherenceCategory::Na
    }
}
