//! `tm-sim` — model orchestrator for the transmission model.
//!
//! # Event loop
//!
//! Everything the model does is an action on one tick-ordered queue.  The
//! whole-tick step reschedules itself; the rest are placed around it:
//!
//! ```text
//! t - 0.1   ArtInit        start ART for the batch diagnosed for tick t
//! t         Step           ① network dynamics   (NetworkDynamics::update)
//!                          ② overlaps           (if count.overlaps)
//!                          ③ entries            Poisson(daily.entry.rate)
//!                          ④ transmission       one act draw per edge
//!                          ⑤ vitals             progression, PrEP, tests,
//!                                               ageing, mortality
//!                          ⑥ external infections
//!                          ⑦ theta              ln(prev) - ln(cur)
//!                          ⑧ counts             Recorder::tick_counts
//! t + 0.1   Snapshot       network export (save.network.at)
//! any       PrepCessation  end of a PrEP spell
//! any       AdherenceCheck end of an adherence window
//! ```
//!
//! # Modules
//!
//! | Module       | Contents                                               |
//! |--------------|--------------------------------------------------------|
//! | [`config`]   | `ModelConfig`, parsed once from `Parameters`           |
//! | [`builder`]  | `ModelBuilder`                                         |
//! | [`model`]    | `Model` and the step pipeline                          |
//! | [`dynamics`] | `NetworkDynamics` seam and `EdgeEditor`                |
//! | [`recorder`] | `Recorder` callbacks and infection events              |
//! | [`counts`]   | `TickCounts`                                           |
//! | [`snapshot`] | `NetworkSnapshot` export/import format                 |
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                  |
//! |-----------|---------------------------------------------------------|
//! | `fx-hash` | FxHash for the biomarker id set.                        |
//! | `serde`   | Serialize/Deserialize on snapshots and `TickCounts`.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tm_core::Parameters;
//! use tm_sim::{ModelBuilder, NoopRecorder};
//!
//! let params = Parameters::from_path("model.props".as_ref())?;
//! let mut model = ModelBuilder::from_parameters(&params)?
//!     .snapshot(&snapshot)
//!     .build()?;
//! model.run(&mut NoopRecorder)?;
//! ```

pub mod builder;
pub mod config;
pub mod counts;
pub mod dynamics;
pub mod error;
pub mod model;
pub mod recorder;
pub mod snapshot;


pub use builder::ModelBuilder;
pub use config::{
    DemographyConfig, ExternalInfectionConfig, ModelConfig, PrepConfig, RunConfig, SaveAt,
    SexActConfig, StageConfig,
};
pub use counts::TickCounts;
pub use dynamics::{EdgeEditor, NetworkDynamics, StaticNetwork};
pub use error::{SimError, SimResult};
pub use model::Model;
pub use recorder::{InfectionEvent, InfectionSource, NoopRecorder, PartnerState, Recorder};
pub use snapshot::{EdgeSnapshot, NetworkSnapshot};
