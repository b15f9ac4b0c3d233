//! # Imperative (hot) sources.
//!
//! Bridges from imperative code into the stream world:
//!
//! ```text
//! BroadcastingEventSource<T>   emit_event/complete fan out to current subscribers
//! CachingEventSource<T>        same, plus replay of the latest value on subscribe
//! ```

mod broadcasting;
mod caching;

pub use broadcasting::BroadcastingEventSource;
pub use caching::CachingEventSource;
