//! # Eventual combinators.
//!
//! All operators are built from the [`Eventual`] contract alone. Each one
//! registers its upstream subscription in the downstream source (or in a
//! per-subscription [`CompositeSubscription`]) **before** connecting, so
//! cancelling the result always reaches every live upstream.
//!
//! | Operator            | Upstreams live at once | Completes when                  |
//! |---------------------|------------------------|---------------------------------|
//! | `map`               | 1                      | upstream completes              |
//! | `and_then`          | 1 (first, then second) | second completes                |
//! | `zip` / `zip_with`  | all                    | every input completed           |
//! | `race`              | all until a winner     | first input completes           |
//!
//! Panics raised by user functions propagate to whoever called `complete`.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::stream::{EventStream, StreamSource};
use crate::subscription::{CompositeSubscription, Subscription};

use super::eventual::{Eventual, EventualSource};
use super::potential::{Completable, Potential};

impl<T: Send + 'static> Eventual<T> {
    /// Transforms the completed value.
    pub fn map<R: Send + 'static>(&self, f: impl Fn(T) -> R + Send + Sync + 'static) -> Eventual<R> {
        let upstream = self.clone();
        let f = Arc::new(f);
        Eventual::new(move |source: EventualSource<R>| {
            let f = Arc::clone(&f);
            let out = source.clone();
            upstream.subscribe_into(&source, move |value| out.complete(f(value)));
        })
    }

    /// Chains a second eventual produced from this one's value.
    ///
    /// Only one stage is live at a time: cancelling before the first
    /// completes cancels the first; cancelling afterwards cancels the second.
    pub fn and_then<R: Send + 'static>(
        &self,
        f: impl Fn(T) -> Eventual<R> + Send + Sync + 'static,
    ) -> Eventual<R> {
        let upstream = self.clone();
        let f = Arc::new(f);
        Eventual::new(move |source: EventualSource<R>| {
            let f = Arc::clone(&f);
            let next = source.clone();
            upstream.subscribe_into(&source, move |value| {
                let second = f(value);
                let out = next.clone();
                // Replaces (and releases) the finished first stage.
                second.subscribe_into(&next, move |result| out.complete(result));
            });
        })
    }

    /// Chains a stream produced from this eventual's value.
    pub fn and_then_events<R: Send + 'static>(
        &self,
        f: impl Fn(T) -> EventStream<R> + Send + Sync + 'static,
    ) -> EventStream<R> {
        let upstream = self.clone();
        let f = Arc::new(f);
        EventStream::new(move |source: StreamSource<R>| {
            let f = Arc::clone(&f);
            let next = source.clone();
            upstream.subscribe_into(&source, move |value| {
                f(value).subscribe_into(&next, next.relay());
            });
        })
    }

    /// Combines this value with `other`'s once both completed.
    pub fn zip_with<U, R>(
        &self,
        other: &Eventual<U>,
        f: impl Fn(T, U) -> R + Send + Sync + 'static,
    ) -> Eventual<R>
    where
        U: Send + 'static,
        R: Send + 'static,
    {
        let (left, right) = (self.clone(), other.clone());
        let f = Arc::new(f);
        Eventual::new(move |source: EventualSource<R>| {
            let inputs = Arc::new(CompositeSubscription::new());
            source.set_subscription(Subscription::from_cancel(inputs.clone()));
            let pair: Arc<Mutex<(Option<T>, Option<U>)>> = Arc::new(Mutex::new((None, None)));

            let (l_pair, l_out, l_f) = (Arc::clone(&pair), source.clone(), Arc::clone(&f));
            left.subscribe_into(&*inputs, move |value| {
                let ready = {
                    let mut pair = l_pair.lock();
                    pair.0 = Some(value);
                    take_pair(&mut pair)
                };
                if let Some((t, u)) = ready {
                    l_out.complete(l_f(t, u));
                }
            });

            let (r_pair, r_out, r_f) = (pair, source.clone(), Arc::clone(&f));
            right.subscribe_into(&*inputs, move |value| {
                let ready = {
                    let mut pair = r_pair.lock();
                    pair.1 = Some(value);
                    take_pair(&mut pair)
                };
                if let Some((t, u)) = ready {
                    r_out.complete(r_f(t, u));
                }
            });
        })
    }

    /// Emits the value as a single event followed by completion.
    pub fn to_events(&self) -> EventStream<T> {
        let upstream = self.clone();
        EventStream::new(move |source: StreamSource<T>| {
            let out = source.clone();
            upstream.subscribe_into(&source, move |value| {
                out.emit_event(value);
                out.complete();
            });
        })
    }

    /// Wraps the value in `Some`.
    pub fn into_potential(&self) -> Potential<T> {
        self.map(Some)
    }

    /// Discards the value, keeping only the completion signal.
    pub fn ignore_value(&self) -> Completable {
        self.map(|_| ())
    }
}

fn take_pair<T, U>(pair: &mut (Option<T>, Option<U>)) -> Option<(T, U)> {
    match (pair.0.take(), pair.1.take()) {
        (Some(t), Some(u)) => Some((t, u)),
        (t, u) => {
            *pair = (t, u);
            None
        }
    }
}

/// Per-subscription zip state. One lock guards both the slots and the
/// pending count, so exactly one input observes `pending == 0`.
struct ZipState<T> {
    slots: Vec<Option<T>>,
    pending: usize,
}

/// Completes once every input completed, combining values in input order.
///
/// Inputs are subscribed concurrently. Cancelling before completion cancels
/// every input that has not completed yet. An empty list completes
/// immediately with `combiner(vec![])`.
pub fn zip<T, R>(
    eventuals: Vec<Eventual<T>>,
    combiner: impl Fn(Vec<T>) -> R + Send + Sync + 'static,
) -> Eventual<R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    let combiner = Arc::new(combiner);
    Eventual::new(move |source: EventualSource<R>| {
        if eventuals.is_empty() {
            source.complete(combiner(Vec::new()));
            return;
        }
        let inputs = Arc::new(CompositeSubscription::new());
        source.set_subscription(Subscription::from_cancel(inputs.clone()));
        let state = Arc::new(Mutex::new(ZipState {
            slots: eventuals.iter().map(|_| None).collect(),
            pending: eventuals.len(),
        }));

        for (index, eventual) in eventuals.iter().enumerate() {
            let state = Arc::clone(&state);
            let out = source.clone();
            let combiner = Arc::clone(&combiner);
            eventual.subscribe_into(&*inputs, move |value| {
                let values = {
                    let mut state = state.lock();
                    state.slots[index] = Some(value);
                    state.pending -= 1;
                    if state.pending > 0 {
                        return;
                    }
                    state.slots.drain(..).flatten().collect::<Vec<_>>()
                };
                if !out.is_cancelled() {
                    out.complete(combiner(values));
                }
            });
        }
    })
}

/// Completes with the first input to complete; every other input is
/// cancelled right away.
///
/// If a contender completes while being subscribed, the remaining contenders
/// are never subscribed. An empty list never completes.
pub fn race<T: Send + 'static>(eventuals: Vec<Eventual<T>>) -> Eventual<T> {
    Eventual::new(move |source: EventualSource<T>| {
        let contenders = Arc::new(CompositeSubscription::new());
        source.set_subscription(Subscription::from_cancel(contenders.clone()));
        for eventual in &eventuals {
            if source.is_cancelled() {
                break;
            }
            let winner = source.clone();
            eventual.subscribe_into(&*contenders, move |value| winner.complete(value));
        }
    })
}
