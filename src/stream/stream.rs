//! # Event streams: zero or more events, then an optional completion.
//!
//! An [`EventStream<T>`] is cold: every subscription runs the builder with a
//! fresh [`StreamSource`].
//!
//! ## Lifecycle of one subscription
//! ```text
//! Active ──emit_event*──► complete() ──► Completed ─┐
//!   │                                                ├─► absorbing: no callbacks
//!   └──────────────────── cancel() ──────────────────┘
//! ```
//!
//! ## Rules
//! - `emit_event`/`complete` after cancellation are silent no-ops.
//! - `complete` calls `on_complete` exactly once, then auto-cancels.
//! - Events of one subscription reach the sink in emission order; the
//!   producer decides on which thread.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use eventual::events_of;
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let out = Arc::clone(&seen);
//! events_of(vec![1, 2, 3])
//!     .map(|v| v * 2)
//!     .for_each(move |v| out.lock().unwrap().push(v));
//!
//! assert_eq!(*seen.lock().unwrap(), vec![2, 4, 6]);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::core::{Attach, Connection};
use crate::subscription::Subscription;

use super::sink::{FnSink, Sink};

pub(crate) type SharedSink<T> = Arc<dyn Sink<T>>;

type Builder<T> = dyn Fn(StreamSource<T>) + Send + Sync + 'static;

/// Deferred sequence of events. Cheap to clone; clones share the builder.
pub struct EventStream<T> {
    builder: Arc<Builder<T>>,
}

impl<T> Clone for EventStream<T> {
    fn clone(&self) -> Self {
        Self {
            builder: Arc::clone(&self.builder),
        }
    }
}

impl<T> fmt::Debug for EventStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream").finish_non_exhaustive()
    }
}

/// Producer side of one [`EventStream`] subscription.
pub struct StreamSource<T> {
    conn: Arc<Connection<SharedSink<T>>>,
}

impl<T> Clone for StreamSource<T> {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

impl<T: Send + 'static> StreamSource<T> {
    /// Registers the resources to release when the consumer cancels.
    ///
    /// Replaces (and cancels) a previous registration.
    pub fn set_subscription(&self, sub: Subscription) {
        self.conn.attach(sub);
    }

    /// Delivers one event unless the subscription is cancelled.
    pub fn emit_event(&self, event: T) {
        if let Some(sink) = self.conn.sink() {
            sink.on_event(event);
        }
    }

    /// Signals completion once, then auto-cancels.
    pub fn complete(&self) {
        let _finish = self.conn.finish();
        if let Some(sink) = self.conn.take_sink() {
            sink.on_complete();
        }
    }

    /// `true` once the consumer cancelled or the stream completed.
    pub fn is_cancelled(&self) -> bool {
        self.conn.is_cancelled()
    }

    /// Sink forwarding every event and the completion into this source.
    pub(crate) fn relay(&self) -> SharedSink<T> {
        let (events, done) = (self.clone(), self.clone());
        Arc::new(FnSink::new(
            move |event: T| events.emit_event(event),
            move || done.complete(),
        ))
    }
}

impl<T: Send + 'static> Attach for StreamSource<T> {
    fn attach(&self, sub: Subscription) {
        self.set_subscription(sub);
    }
}

impl<T: Send + 'static> EventStream<T> {
    /// Creates a stream whose builder runs once per subscription.
    pub fn new(builder: impl Fn(StreamSource<T>) + Send + Sync + 'static) -> Self {
        Self {
            builder: Arc::new(builder),
        }
    }

    /// Connects the pipeline with an event handler and a completion handler.
    pub fn subscribe(
        &self,
        on_event: impl Fn(T) + Send + Sync + 'static,
        on_complete: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        self.subscribe_sink(Arc::new(FnSink::new(on_event, on_complete)))
    }

    /// Connects the pipeline, ignoring completion.
    pub fn for_each(&self, on_event: impl Fn(T) + Send + Sync + 'static) -> Subscription {
        self.subscribe_sink(Arc::new(FnSink::events(on_event)))
    }

    /// Connects the pipeline to a shared sink.
    pub fn subscribe_sink(&self, sink: Arc<dyn Sink<T>>) -> Subscription {
        let conn = Connection::new(sink);
        let sub = conn.subscription();
        (self.builder)(StreamSource { conn });
        sub
    }

    /// Registers the new subscription in `slot`, then connects.
    ///
    /// The builder is skipped when `slot` cancelled the subscription on arrival.
    pub(crate) fn subscribe_into(&self, slot: &impl Attach, sink: Arc<dyn Sink<T>>) {
        let conn = Connection::new(sink);
        slot.attach(conn.subscription());
        if conn.is_cancelled() {
            return;
        }
        (self.builder)(StreamSource { conn });
    }

    /// Emits every item of a fresh iterator per subscription, then completes.
    ///
    /// Cancellation is checked before each item, so a consumer that cancels
    /// from inside its callback stops the iteration.
    pub fn from_iter<I>(factory: impl Fn() -> I + Send + Sync + 'static) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::new(move |source| {
            let mut items = factory().into_iter();
            while !source.is_cancelled() {
                match items.next() {
                    Some(item) => source.emit_event(item),
                    None => {
                        source.complete();
                        return;
                    }
                }
            }
        })
    }

    /// A stream that completes immediately without events.
    pub fn empty() -> Self {
        Self::new(|source| source.complete())
    }

    /// A stream that never emits nor completes.
    pub fn never() -> Self {
        Self::new(|_source| {})
    }
}

/// A stream emitting clones of `values` in order, then completing.
pub fn events_of<T>(values: impl IntoIterator<Item = T>) -> EventStream<T>
where
    T: Clone + Send + Sync + 'static,
{
    let values: Arc<[T]> = values.into_iter().collect();
    EventStream::from_iter(move || values.iter().cloned().collect::<Vec<_>>())
}
