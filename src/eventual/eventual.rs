//! # Eventual values: one deferred result per subscription.
//!
//! An [`Eventual<T>`] is a recipe: every [`subscribe`](Eventual::subscribe)
//! runs the builder with a fresh [`EventualSource`], which may complete
//! **at most once** (or never).
//!
//! ## Contract
//! ```text
//! subscribe(sink) ──► builder(source)
//!                        ├─ source.set_subscription(release)   optional
//!                        └─ source.complete(value)             at most once
//!                               ├─► sink(value)
//!                               └─► auto-cancel (release runs)
//! ```
//!
//! ## Rules
//! - `complete` after cancellation (or a second `complete`) is a silent no-op.
//! - The returned [`Subscription`] reports cancelled once the value was delivered.
//! - Panics raised by the sink propagate out of `complete` unchanged.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use eventual::{Eventual, eventual_of};
//!
//! let seen = Arc::new(Mutex::new(None));
//! let out = Arc::clone(&seen);
//! let sub = eventual_of(20).map(|v| v + 1).subscribe(move |v| {
//!     *out.lock().unwrap() = Some(v);
//! });
//!
//! assert_eq!(*seen.lock().unwrap(), Some(21));
//! assert!(sub.is_cancelled());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::core::{Attach, Connection};
use crate::subscription::Subscription;

pub(crate) type EventualSink<T> = Box<dyn FnOnce(T) + Send + 'static>;

type Builder<T> = dyn Fn(EventualSource<T>) + Send + Sync + 'static;

/// Deferred single value. Cheap to clone; clones share the builder.
pub struct Eventual<T> {
    builder: Arc<Builder<T>>,
}

impl<T> Clone for Eventual<T> {
    fn clone(&self) -> Self {
        Self {
            builder: Arc::clone(&self.builder),
        }
    }
}

impl<T> fmt::Debug for Eventual<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Eventual").finish_non_exhaustive()
    }
}

/// Producer side of one [`Eventual`] subscription.
///
/// Clones share one producer. Once the last clone is dropped without
/// completing, the consumer's sink is released: blocking and async waiters
/// observe [`Error::Disconnected`](crate::Error::Disconnected).
pub struct EventualSource<T> {
    producer: Arc<Producer<T>>,
}

struct Producer<T> {
    conn: Arc<Connection<EventualSink<T>>>,
}

impl<T> Drop for Producer<T> {
    fn drop(&mut self) {
        drop(self.conn.take_sink());
    }
}

impl<T> Clone for EventualSource<T> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<T: Send + 'static> EventualSource<T> {
    fn connect(conn: Arc<Connection<EventualSink<T>>>) -> Self {
        Self {
            producer: Arc::new(Producer { conn }),
        }
    }

    fn conn(&self) -> &Connection<EventualSink<T>> {
        &self.producer.conn
    }

    /// Registers the resources to release when the consumer cancels.
    ///
    /// Replaces (and cancels) a previous registration. If the subscription
    /// is already cancelled, `sub` is cancelled immediately.
    pub fn set_subscription(&self, sub: Subscription) {
        self.conn().attach(sub);
    }

    /// Delivers `value` to the consumer, then auto-cancels.
    pub fn complete(&self, value: T) {
        let conn = self.conn();
        let _finish = conn.finish();
        if let Some(sink) = conn.take_sink() {
            sink(value);
        }
    }

    /// `true` once the consumer cancelled or the value was delivered.
    pub fn is_cancelled(&self) -> bool {
        self.conn().is_cancelled()
    }
}

impl<T: Send + 'static> Attach for EventualSource<T> {
    fn attach(&self, sub: Subscription) {
        self.set_subscription(sub);
    }
}

impl<T: Send + 'static> Eventual<T> {
    /// Creates an eventual whose builder runs once per subscription.
    pub fn new(builder: impl Fn(EventualSource<T>) + Send + Sync + 'static) -> Self {
        Self {
            builder: Arc::new(builder),
        }
    }

    /// Connects the pipeline; `on_complete` receives the value at most once.
    pub fn subscribe(&self, on_complete: impl FnOnce(T) + Send + 'static) -> Subscription {
        let conn = Connection::new(Box::new(on_complete) as EventualSink<T>);
        let sub = conn.subscription();
        (self.builder)(EventualSource::connect(conn));
        sub
    }

    /// Registers the new subscription in `slot`, then connects.
    ///
    /// The builder is skipped when `slot` cancelled the subscription on arrival.
    pub(crate) fn subscribe_into(
        &self,
        slot: &impl Attach,
        on_complete: impl FnOnce(T) + Send + 'static,
    ) {
        let conn = Connection::new(Box::new(on_complete) as EventualSink<T>);
        slot.attach(conn.subscription());
        if conn.is_cancelled() {
            return;
        }
        (self.builder)(EventualSource::connect(conn));
    }

    /// An eventual that never completes.
    ///
    /// The source stays parked in its own release action until the consumer
    /// cancels.
    pub fn never() -> Self {
        Self::new(|source: EventualSource<T>| {
            let parked = source.clone();
            source.set_subscription(Subscription::create(move || drop(parked)));
        })
    }

    /// Computes the value lazily, once per subscription.
    pub fn from_fn(f: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self::new(move |source| source.complete(f()))
    }
}

/// An eventual that completes immediately with a clone of `value`.
pub fn eventual_of<T>(value: T) -> Eventual<T>
where
    T: Clone + Send + Sync + 'static,
{
    Eventual::new(move |source| source.complete(value.clone()))
}
