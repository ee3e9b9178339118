//! `tm-network` — the sexual contact network.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`edge`]    | `Edge`, `EdgeType`, `CondomUse`, `CondomCategory`           |
//! | [`network`] | `ContactNetwork` (vertex set + typed edge map)              |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `EdgeType`.             |
//!
//! Vertices are `PersonId`s only; person state lives in
//! `tm_person::Population`.  The model keeps the two in step.

pub mod edge;
pub mod error;
pub mod network;


pub use edge::{CondomCategory, CondomUse, Edge, EdgeType};
pub use error::{NetworkError, NetworkResult};
pub use network::ContactNetwork;
