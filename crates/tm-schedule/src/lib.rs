//! `tm-schedule` — the discrete-event side of the model.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                |
//! |-------------------|---------------------------------------------------------|
//! | [`event_queue`]   | `EventQueue<E>` (`BTreeMap<Tick, VecDeque<E>>`)         |
//! | [`art_scheduler`] | `ArtScheduler` (`BTreeMap<Tick, Vec<PersonId>>`)        |
//!
//! # Ordering
//!
//! Events fire in tick order; events sharing a tick fire in the order they
//! were pushed.  The model relies on fractional ticks to place work around
//! the whole-tick step:
//!
//! ```text
//!   t - 0.1   ART initiation batch for tick t
//!   t         model step
//!   t + 0.1   snapshot export
//!   t + 1.1+k PrEP cessation started at t
//! ```

pub mod art_scheduler;
pub mod event_queue;

#[cfg(test)]
mod tests;

pub use art_scheduler::ArtScheduler;
pub use event_queue::EventQueue;
