//! Partnership edges.

use std::fmt;

use tm_core::{EdgeId, PersonId};

/// Network layer of a partnership.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeType {
    Steady,
    Casual,
}

impl EdgeType {
    pub const ALL: [EdgeType; 2] = [EdgeType::Steady, EdgeType::Casual];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            EdgeType::Steady => 0,
            EdgeType::Casual => 1,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(EdgeType::Steady),
            1 => Some(EdgeType::Casual),
            _ => None,
        }
    }

    pub fn other(self) -> Self {
        match self {
            EdgeType::Steady => EdgeType::Casual,
            EdgeType::Casual => EdgeType::Steady,
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeType::Steady => f.write_str("steady"),
            EdgeType::Casual => f.write_str("casual"),
        }
    }
}

/// How often a partnership uses condoms.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CondomCategory {
    #[default]
    Never,
    Rarely,
    Sometimes,
    Usually,
    Always,
}

impl CondomCategory {
    pub const ALL: [CondomCategory; 5] = [
        CondomCategory::Never,
        CondomCategory::Rarely,
        CondomCategory::Sometimes,
        CondomCategory::Usually,
        CondomCategory::Always,
    ];

    /// Parameter-name fragment (`sd.steady.<name>.use.condoms`).
    pub fn name(self) -> &'static str {
        match self {
            CondomCategory::Never => "never",
            CondomCategory::Rarely => "rarely",
            CondomCategory::Sometimes => "sometimes",
            CondomCategory::Usually => "usually",
            CondomCategory::Always => "always",
        }
    }
}

/// Condom-use category of an edge and the per-act use probability it implies.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CondomUse {
    pub category: CondomCategory,
    pub use_prob: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub id:     EdgeId,
    pub v1:     PersonId,
    pub v2:     PersonId,
    pub kind:   EdgeType,
    pub condom: CondomUse,
}

impl Edge {
    /// `true` iff `draw` falls under the edge's per-act use probability.
    #[inline]
    pub fn use_condom(&self, draw: f64) -> bool {
        draw < self.condom.use_prob
    }

    /// The endpoint that is not `person`.
    pub fn other(&self, person: PersonId) -> PersonId {
        if self.v1 == person { self.v2 } else { self.v1 }
    }

    pub fn touches(&self, person: PersonId) -> bool {
        self.v1 == person || self.v2 == person
    }
}
