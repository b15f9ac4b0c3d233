//! # Event streams: multi-valued deferred sequences.
//!
//! ```text
//! EventStream<T> ──subscribe(sink)──► builder(StreamSource<T>)
//!                                         ├─ emit_event(v)*  ──► sink.on_event(v)
//!                                         └─ complete()      ──► sink.on_complete()
//! ```
//!
//! Operators are grouped by shape:
//! - event-wise: `map`, `filter`, `scan`, `changes`, `take`, ...
//! - higher-order and fan-in: `flat_map`, `switch_map`, [`merge_events`]
//! - sharing: `broadcast`
//! - terminal: `first`, `first_or_error`, `collect`, `completion`

mod combinators;
mod flatten;
mod share;
mod sink;
#[allow(clippy::module_inception)]
mod stream;
mod terminal;

pub use flatten::merge_events;
pub use sink::{FnSink, Sink};
pub use stream::{EventStream, StreamSource, events_of};
