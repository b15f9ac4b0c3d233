//! # eventual
//!
//! **Eventual** is a minimal reactive-effects library: composable, cancellable
//! single values ([`Eventual`]), multi-value streams ([`EventStream`]) and
//! completion signals ([`Completable`]), tied together by one resource handle
//! ([`Subscription`]).
//!
//! Everything is cold and callback-based: nothing runs until `subscribe`,
//! and every `subscribe` call owns exactly the resources it acquired,
//! transitively, until its [`Subscription`] is cancelled.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   producers                      operators                       consumers
//! ┌──────────────────────┐   ┌─────────────────────────────┐   ┌─────────────────┐
//! │ Eventual::new        │   │ map / and_then / zip / race │   │ subscribe(..)   │
//! │ EventStream::new     │──►│ filter / scan / changes     │──►│ get_blocking()  │
//! │ events_of / from_iter│   │ flat_map / switch_map       │   │ .await          │
//! │ Broadcasting/Caching │   │ merge / broadcast / first   │   │ into_stream()   │
//! │ from_worker / timer  │   │ deliver_on / subscribe_on   │   │                 │
//! └──────────────────────┘   └─────────────────────────────┘   └────────┬────────┘
//!            ▲                                                          │
//!            └──────────────── Subscription::cancel() ◄─────────────────┘
//!                       (propagates to every live upstream)
//! ```
//!
//! ### One subscription
//! ```text
//! subscribe(sink)
//!   ├─► allocate connection { sink, cancelled, upstream holder }
//!   ├─► run builder(source)
//!   │     ├─ source.set_subscription(release)
//!   │     ├─ source.emit_event(v)*          (streams)
//!   │     └─ source.complete(..)            at most once, then auto-cancel
//!   └─► return Subscription (idempotent cancel)
//! ```
//!
//! ## Features
//! | Area              | Description                                            | Key types                                        |
//! |-------------------|--------------------------------------------------------|--------------------------------------------------|
//! | **Subscriptions** | Idempotent, race-safe cancellation and containers.     | [`Subscription`], [`SubscriptionHolder`], [`CompositeSubscription`] |
//! | **Eventuals**     | Single deferred values, optional values, signals.      | [`Eventual`], [`Potential`], [`Completable`]     |
//! | **Streams**       | Deferred event sequences with rich combinators.        | [`EventStream`], [`Sink`], [`FnSink`]            |
//! | **Hot sources**   | Imperative fan-out with optional replay.               | [`BroadcastingEventSource`], [`CachingEventSource`] |
//! | **Workers**       | Thread hopping, async bridges, timers.                 | [`Worker`], [`WorkerPool`], [`WorkerConfig`]     |
//! | **Errors**        | Typed recoverable failures.                            | [`Error`]                                        |
//!
//! ## Optional features
//! - `logging` (default): `log_each`, `log_result`, `log_subscription`
//!   decorators emitting `tracing` events.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use eventual::{CachingEventSource, eventual_of, zip};
//!
//! let temperature = CachingEventSource::new(20);
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let out = Arc::clone(&seen);
//!
//! let sub = temperature
//!     .events()
//!     .changes()
//!     .map(|celsius| celsius * 9 / 5 + 32)
//!     .for_each(move |f| out.lock().unwrap().push(f));
//!
//! temperature.emit_event(20);
//! temperature.emit_event(25);
//! sub.cancel();
//! temperature.emit_event(30);
//! assert_eq!(*seen.lock().unwrap(), vec![68, 77]);
//!
//! let total = zip(vec![eventual_of(1), eventual_of(2)], |v| v.iter().sum::<i32>());
//! assert_eq!(total.get_blocking(), Ok(3));
//! ```
mod core;
mod error;
mod eventual;
mod observe;
mod sources;
mod stream;
mod subscription;
mod worker;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use error::{Error, Result};
pub use eventual::{
    Completable, Eventual, EventualSource, Potential, completed, eventual_of, potential_of, race,
    zip,
};
pub use sources::{BroadcastingEventSource, CachingEventSource};
pub use stream::{EventStream, FnSink, Sink, StreamSource, events_of, merge_events};
pub use subscription::{
    Cancel, CompositeSubscription, Subscription, SubscriptionGuard, SubscriptionHolder,
};
pub use worker::{
    EventReceiver, EventualFuture, InlineWorker, Job, RuntimeWorker, Worker, WorkerConfig,
    WorkerPool, timer,
};
