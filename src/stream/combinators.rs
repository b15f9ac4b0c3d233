//! # Event-wise stream combinators.
//!
//! Every operator here keeps exactly one upstream subscription per
//! downstream subscription, registered in the downstream source before the
//! upstream connects. Completion passes through unchanged unless the
//! operator terminates early.
//!
//! | Operator            | Emits                                   | Completes when            |
//! |---------------------|-----------------------------------------|---------------------------|
//! | `map` / `filter`    | transformed / matching events           | upstream completes        |
//! | `scan`              | running fold, one per event             | upstream completes        |
//! | `changes`           | events differing from the previous one  | upstream completes        |
//! | `with_latest_from`  | primary events paired with other's last | primary completes         |
//! | `and_then`          | first's events, then second's           | second completes          |
//! | `until`             | events before the match                 | match or upstream end     |
//! | `complete_when`     | events up to and including the match    | match or upstream end     |
//! | `take(n)`           | the first `n` events                    | `n`-th event or end       |
//!
//! User function panics propagate to the producer's `emit_event` call.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::subscription::{CompositeSubscription, Subscription};

use super::sink::FnSink;
use super::stream::{EventStream, StreamSource};

impl<T: Send + 'static> EventStream<T> {
    /// Builds a derived stream whose upstream events go through `on_event`.
    ///
    /// Completion is forwarded unchanged.
    fn relay_with<R: Send + 'static>(
        &self,
        on_event: impl Fn(&StreamSource<R>, T) + Send + Sync + 'static,
    ) -> EventStream<R> {
        let upstream = self.clone();
        let on_event = Arc::new(on_event);
        EventStream::new(move |source: StreamSource<R>| {
            let (out, done, on_event) = (source.clone(), source.clone(), Arc::clone(&on_event));
            upstream.subscribe_into(
                &source,
                Arc::new(FnSink::new(
                    move |event: T| on_event(&out, event),
                    move || done.complete(),
                )),
            );
        })
    }

    /// Transforms every event.
    pub fn map<R: Send + 'static>(&self, f: impl Fn(T) -> R + Send + Sync + 'static) -> EventStream<R> {
        self.relay_with(move |out, event| out.emit_event(f(event)))
    }

    /// Forwards only events matching `predicate`.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> EventStream<T> {
        self.relay_with(move |out, event| {
            if predicate(&event) {
                out.emit_event(event);
            }
        })
    }

    /// Transforms and filters in one step; `None` drops the event.
    pub fn filter_map<R: Send + 'static>(
        &self,
        f: impl Fn(T) -> Option<R> + Send + Sync + 'static,
    ) -> EventStream<R> {
        self.relay_with(move |out, event| {
            if let Some(value) = f(event) {
                out.emit_event(value);
            }
        })
    }

    /// Emits the running fold of `update` over the events, starting at `init`.
    ///
    /// The seed itself is not emitted. Each subscription folds independently.
    pub fn scan<A>(
        &self,
        init: A,
        update: impl Fn(&A, T) -> A + Send + Sync + 'static,
    ) -> EventStream<A>
    where
        A: Clone + Send + Sync + 'static,
    {
        let upstream = self.clone();
        let update = Arc::new(update);
        EventStream::new(move |source: StreamSource<A>| {
            let acc = Arc::new(Mutex::new(init.clone()));
            let (out, done, update) = (source.clone(), source.clone(), Arc::clone(&update));
            upstream.subscribe_into(
                &source,
                Arc::new(FnSink::new(
                    move |event: T| {
                        let next = {
                            let mut acc = acc.lock();
                            *acc = update(&acc, event);
                            acc.clone()
                        };
                        out.emit_event(next);
                    },
                    move || done.complete(),
                )),
            );
        })
    }

    /// Drops events equal to the immediately preceding one.
    pub fn changes(&self) -> EventStream<T>
    where
        T: PartialEq + Clone,
    {
        let upstream = self.clone();
        EventStream::new(move |source: StreamSource<T>| {
            let last: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));
            let (out, done) = (source.clone(), source.clone());
            upstream.subscribe_into(
                &source,
                Arc::new(FnSink::new(
                    move |event: T| {
                        let fresh = {
                            let mut last = last.lock();
                            if last.as_ref() == Some(&event) {
                                false
                            } else {
                                *last = Some(event.clone());
                                true
                            }
                        };
                        if fresh {
                            out.emit_event(event);
                        }
                    },
                    move || done.complete(),
                )),
            );
        })
    }

    /// Pairs every event with the latest value seen on `other`.
    ///
    /// Events arriving before `other` emitted anything are dropped. Only this
    /// stream's completion completes the result; `other` completing merely
    /// freezes its latest value.
    pub fn with_latest_from<U, R>(
        &self,
        other: &EventStream<U>,
        combiner: impl Fn(T, &U) -> R + Send + Sync + 'static,
    ) -> EventStream<R>
    where
        U: Send + Sync + 'static,
        R: Send + 'static,
    {
        let (primary, other) = (self.clone(), other.clone());
        let combiner = Arc::new(combiner);
        EventStream::new(move |source: StreamSource<R>| {
            let inputs = Arc::new(CompositeSubscription::new());
            source.set_subscription(Subscription::from_cancel(inputs.clone()));
            let latest: Arc<Mutex<Option<U>>> = Arc::new(Mutex::new(None));

            let store = Arc::clone(&latest);
            other.subscribe_into(
                &*inputs,
                Arc::new(FnSink::events(move |value: U| {
                    *store.lock() = Some(value);
                })),
            );

            let (out, done, combiner) = (source.clone(), source.clone(), Arc::clone(&combiner));
            primary.subscribe_into(
                &*inputs,
                Arc::new(FnSink::new(
                    move |event: T| {
                        let combined = latest.lock().as_ref().map(|value| combiner(event, value));
                        if let Some(combined) = combined {
                            out.emit_event(combined);
                        }
                    },
                    move || done.complete(),
                )),
            );
        })
    }

    /// Concatenates `next` after this stream.
    ///
    /// `next` is subscribed only once this stream completed; cancelling
    /// before that means `next` is never subscribed.
    pub fn and_then(&self, next: &EventStream<T>) -> EventStream<T> {
        let (first, second) = (self.clone(), next.clone());
        EventStream::new(move |source: StreamSource<T>| {
            let (out, then, second) = (source.clone(), source.clone(), second.clone());
            first.subscribe_into(
                &source,
                Arc::new(FnSink::new(
                    move |event: T| out.emit_event(event),
                    move || {
                        if then.is_cancelled() {
                            return;
                        }
                        // Replaces (and releases) the finished first stage.
                        second.subscribe_into(&then, then.relay());
                    },
                )),
            );
        })
    }

    /// Completes right before the first event matching `predicate`,
    /// without emitting it.
    pub fn until(&self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> EventStream<T> {
        self.relay_with(move |out, event| {
            if predicate(&event) {
                out.complete();
            } else {
                out.emit_event(event);
            }
        })
    }

    /// Emits the first event matching `predicate`, then completes.
    pub fn complete_when(
        &self,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> EventStream<T> {
        self.relay_with(move |out, event| {
            let last = predicate(&event);
            out.emit_event(event);
            if last {
                out.complete();
            }
        })
    }

    /// Emits at most `count` events, then completes.
    pub fn take(&self, count: usize) -> EventStream<T> {
        if count == 0 {
            return EventStream::empty();
        }
        let upstream = self.clone();
        EventStream::new(move |source: StreamSource<T>| {
            let remaining = Arc::new(AtomicUsize::new(count));
            let (out, done) = (source.clone(), source.clone());
            upstream.subscribe_into(
                &source,
                Arc::new(FnSink::new(
                    move |event: T| {
                        let claimed = remaining
                            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
                        match claimed {
                            Ok(1) => {
                                out.emit_event(event);
                                out.complete();
                            }
                            Ok(_) => out.emit_event(event),
                            Err(_) => {}
                        }
                    },
                    move || done.complete(),
                )),
            );
        })
    }
}
