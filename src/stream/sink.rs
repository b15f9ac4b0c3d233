//! # Consumer-side callbacks for event streams.
//!
//! [`Sink`] is the capability a stream delivers into. The library guarantees,
//! per subscription:
//! - `on_event` calls arrive in the producer's emission order;
//! - `on_complete` is called at most once, and nothing follows it;
//! - nothing is delivered after the subscription was cancelled.
//!
//! [`FnSink`] adapts a pair of closures.

/// Receiver of stream events and the optional completion signal.
pub trait Sink<T>: Send + Sync {
    /// Receives one event.
    fn on_event(&self, event: T);

    /// Receives the completion signal. Default: ignore.
    fn on_complete(&self) {}
}

/// Closure-backed [`Sink`].
pub struct FnSink<E, C> {
    on_event: E,
    on_complete: C,
}

impl<E, C> FnSink<E, C> {
    /// Creates a sink from an event handler and a completion handler.
    pub fn new(on_event: E, on_complete: C) -> Self {
        Self {
            on_event,
            on_complete,
        }
    }
}

impl<E> FnSink<E, fn()> {
    /// Creates a sink that ignores completion.
    pub fn events(on_event: E) -> Self {
        fn ignore() {}
        Self::new(on_event, ignore as fn())
    }
}

impl<T, E, C> Sink<T> for FnSink<E, C>
where
    E: Fn(T) + Send + Sync,
    C: Fn() + Send + Sync,
{
    fn on_event(&self, event: T) {
        (self.on_event)(event);
    }

    fn on_complete(&self) {
        (self.on_complete)();
    }
}
