//! Condom-use category assignment.
//!
//! The configuration holds one row per (partnership concordance, network
//! type): for each of the five categories, the probability of a partnership
//! falling in it and the per-act use probability it implies.  An edge draws
//! its category once, when it is initialized, and keeps it for life.

use tm_core::SimRng;
use tm_network::{CondomCategory, CondomUse, EdgeType};

use crate::{DiseaseError, DiseaseResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PartnershipType {
    /// Exactly one partner infected.
    Serodiscordant,
    Seroconcordant,
}

impl PartnershipType {
    pub fn of(a_infected: bool, b_infected: bool) -> Self {
        if a_infected != b_infected {
            PartnershipType::Serodiscordant
        } else {
            PartnershipType::Seroconcordant
        }
    }

    fn index(self) -> usize {
        match self {
            PartnershipType::Serodiscordant => 0,
            PartnershipType::Seroconcordant => 1,
        }
    }
}

/// Category probabilities and per-act use probabilities, in
/// `CondomCategory::ALL` order.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CondomUseRow {
    pub category_probs: [f64; 5],
    pub use_probs:      [f64; 5],
}

#[derive(Clone, Debug, PartialEq)]
pub struct CondomUseAssigner {
    /// `[partnership type][network type]`, cumulative category probabilities.
    rows: [[CondomUseRow; 2]; 2],
}

impl CondomUseAssigner {
    /// Build from the four rows.  Every probability must lie in `[0, 1]` and
    /// each row's category probabilities must sum to at most 1.
    pub fn new(rows: [[CondomUseRow; 2]; 2]) -> DiseaseResult<Self> {
        let mut cumulative = rows;
        for (pi, by_net) in rows.iter().enumerate() {
            for (ni, row) in by_net.iter().enumerate() {
                let mut total = 0.0;
                for (ci, (&cat, &use_p)) in row.category_probs.iter().zip(&row.use_probs).enumerate() {
                    if !(0.0..=1.0).contains(&cat) || !(0.0..=1.0).contains(&use_p) {
                        return Err(DiseaseError::Config(format!(
                            "condom use probabilities must be in [0, 1] (row {pi}/{ni}, {})",
                            CondomCategory::ALL[ci].name()
                        )));
                    }
                    total += cat;
                    cumulative[pi][ni].category_probs[ci] = total;
                }
                if total > 1.0 + 1e-9 {
                    return Err(DiseaseError::Config(format!(
                        "condom use category probabilities sum to {total} (row {pi}/{ni})"
                    )));
                }
            }
        }
        Ok(Self { rows: cumulative })
    }

    /// Draw an edge's category.  Consumes one uniform draw; a draw past the
    /// last cumulative probability falls in the last category.
    pub fn init_edge(&self, ptype: PartnershipType, kind: EdgeType, rng: &mut SimRng) -> CondomUse {
        let row = &self.rows[ptype.index()][kind.index()];
        let draw = rng.uniform();
        let ci = row
            .category_probs
            .iter()
            .position(|&cum| draw <= cum)
            .unwrap_or(CondomCategory::ALL.len() - 1);
        CondomUse { category: CondomCategory::ALL[ci], use_prob: row.use_probs[ci] }
    }
}
