//! `tm-disease` — the disease and intervention calculators.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                       |
//! |------------------|----------------------------------------------------------------|
//! | [`cd4`]          | `Cd4Calculator`, `BValues`                                     |
//! | [`viral_load`]   | `ViralLoadCalculator`, `ViralLoadSlopeCalculator`, `ViralLoadParams` |
//! | [`stage`]        | `Stage`, `StageKind`, `StageMap` (infectivity by stage)        |
//! | [`transmission`] | `TransmissionRunner` (per-act infection decision)              |
//! | [`condom`]       | `CondomUseAssigner`, `PartnershipType`                         |
//! | [`art`]          | `ArtLagCalculator`, `LagBin`, `AdherenceAssigner`              |
//! | [`prep`]         | `PrepUptake` (initiation rate and cessation delay)             |
//! | [`mortality`]    | `AgeBinMortality`, `CauseOfDeath`, `PartnershipEnd`            |
//! | [`error`]        | `DiseaseError`, `DiseaseResult<T>`                             |
//!
//! # Design notes
//!
//! The calculators are plain values built once from configuration.  The pure
//! ones (CD4, viral load, stage infectivity) take `&InfectionRecord` and hold
//! no mutable state; the stochastic ones take `&mut SimRng` and document the
//! draws they consume, because the draw order is part of the model.

pub mod art;
pub mod cd4;
pub mod condom;
pub mod error;
pub mod mortality;
pub mod prep;
pub mod stage;
pub mod transmission;
pub mod viral_load;

#[cfg(test)]
mod tests;

pub use art::{AdherenceAssigner, AdherenceParams, ArtLagCalculator, LagBin};
pub use cd4::{BValues, Cd4Calculator};
pub use condom::{CondomUseAssigner, CondomUseRow, PartnershipType};
pub use error::{DiseaseError, DiseaseResult};
pub use mortality::{AgeBinMortality, CauseOfDeath, MortalityBin, PartnershipEnd};
pub use prep::PrepUptake;
pub use stage::{Stage, StageKind, StageMap};
pub use transmission::{TransmissionParams, TransmissionRunner};
pub use viral_load::{ViralLoadCalculator, ViralLoadParams, ViralLoadSlopeCalculator};
