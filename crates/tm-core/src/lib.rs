//! `tm-core` — foundational types for the transmission model workspace.
//!
//! This crate is a dependency of every other `tm-*` crate.  It has no `tm-*`
//! dependencies of its own.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `PersonId`, `EdgeId`                                  |
//! | [`time`]        | `Tick`, `TimeStep`                                    |
//! | [`rng`]         | `SimRng` (the one shared stream), `GeometricDistribution` |
//! | [`params`]      | `Parameters` key→value store                          |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids and ticks.           |

pub mod error;
pub mod ids;
pub mod params;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{EdgeId, PersonId};
pub use params::Parameters;
pub use rng::{GeometricDistribution, SimRng};
pub use time::{Tick, TimeStep};
