//! `tm-person` — individual-level state for the transmission model.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`person`]      | `Person`, `SexualRole`, `TestOutcome`                     |
//! | [`infection`]   | `InfectionRecord` (disease and ART state)                 |
//! | [`prep`]        | `PrepStatus`, `PrepRecord`                                |
//! | [`diagnoser`]   | `Diagnoser`, `TestResult` (testing-interval state machine) |
//! | [`adherence`]   | `AdherenceCategory`, `AdherenceRecord`                    |
//! | [`population`]  | `Population` (id-indexed arena with tombstones)           |
//! | [`creator`]     | `PersonCreator`, `CreatorParams`                          |
//! | [`snapshot`]    | `PersonSnapshot` (flat export/import projection)          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `PersonSnapshot`.     |
//!
//! Disease arithmetic (CD4, viral load, infectivity) lives in `tm-disease`;
//! this crate only stores the results and enforces the state transitions.

pub mod adherence;
pub mod creator;
pub mod diagnoser;
pub mod infection;
pub mod person;
pub mod population;
pub mod prep;
pub mod snapshot;


pub use adherence::{AdherenceCategory, AdherenceRecord};
pub use creator::{CreatorParams, PersonCreator, RoleProbabilities};
pub use diagnoser::{Diagnoser, TestResult};
pub use infection::InfectionRecord;
pub use person::{Person, SexualRole, TestOutcome};
pub use population::Population;
pub use prep::{PrepRecord, PrepStatus};
pub use snapshot::PersonSnapshot;
