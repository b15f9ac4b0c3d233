//! # Eventual values: single deferred results.
//!
//! ```text
//! Eventual<T>          0 or 1 value per subscription
//! Potential<T>         Eventual<Option<T>>: value or explicit "no value"
//! Completable          Eventual<()>: completion signal only
//! ```
//!
//! Construction goes through a builder receiving an [`EventualSource`];
//! composition goes through the combinators (`map`, `and_then`, [`zip`],
//! [`race`], ...); blocking access through `get_blocking`.

mod blocking;
mod combinators;
#[allow(clippy::module_inception)]
mod eventual;
mod potential;

pub use combinators::{race, zip};
pub use eventual::{Eventual, EventualSource, eventual_of};
pub use potential::{Completable, Potential, completed, potential_of};
