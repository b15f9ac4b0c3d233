//! # Broadcasting source that remembers its latest value.
//!
//! [`CachingEventSource`] behaves like a
//! [`BroadcastingEventSource`](super::BroadcastingEventSource) seeded with an
//! initial value. Every new subscriber first receives the latest value,
//! synchronously inside `subscribe`, then every later emission.
//!
//! The latest value is read in the same critical section that registers the
//! subscriber, and emissions racing with the replay queue behind it, so a
//! subscriber never observes a stale replay after a newer event.

use std::fmt;
use std::sync::Arc;

use crate::stream::{EventStream, StreamSource};

use super::broadcasting::{Registry, Replay};

struct Latest<T>(T);

impl<T: Clone + Send + 'static> Replay<T> for Latest<T> {
    fn record(&mut self, event: &T) {
        self.0 = event.clone();
    }

    fn replay(&self) -> Option<T> {
        Some(self.0.clone())
    }
}

/// Hot source replaying its latest value to new subscribers.
pub struct CachingEventSource<T> {
    registry: Arc<Registry<T, Latest<T>>>,
}

impl<T> Clone for CachingEventSource<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> fmt::Debug for CachingEventSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingEventSource").finish_non_exhaustive()
    }
}

impl<T: Clone + Send + 'static> CachingEventSource<T> {
    /// Creates a source whose latest value is `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            registry: Registry::new(Latest(initial)),
        }
    }

    /// Stream view: replays the latest value, then follows emissions.
    ///
    /// After `complete`, subscribers receive the latest value and then
    /// completion.
    pub fn events(&self) -> EventStream<T> {
        let registry = Arc::clone(&self.registry);
        EventStream::new(move |source: StreamSource<T>| registry.register(source))
    }

    /// Stores `event` as the latest value and delivers it to every subscriber.
    pub fn emit_event(&self, event: T) {
        self.registry.emit(event);
    }

    /// Completes every current subscriber; the latest value is kept.
    pub fn complete(&self) {
        self.registry.complete();
    }

    /// Snapshot of the latest value.
    pub fn latest(&self) -> T {
        self.registry.with_replay(|latest| latest.0.clone())
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_completed(&self) -> bool {
        self.registry.is_completed()
    }
}
