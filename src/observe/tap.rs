//! # Observational decorators.
//!
//! Decorators here run side effects without changing what the consumer
//! sees: same events, same order, same completion, same cancellation.
//!
//! - `on_each(f)`: peeks at every event before it is forwarded.
//! - `do_on_cancel(f)`: runs `f` when the consumer cancels **before**
//!   completion. Completion followed by the automatic release does not count.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::eventual::{Eventual, EventualSource};
use crate::stream::{EventStream, FnSink, StreamSource};
use crate::subscription::{Subscription, SubscriptionHolder};

/// Release action running `on_cancel` unless the subscription finished first.
fn cancel_hook(
    upstream: Arc<SubscriptionHolder>,
    finished: Arc<AtomicBool>,
    on_cancel: Arc<dyn Fn() + Send + Sync>,
) -> Subscription {
    Subscription::create(move || {
        upstream.cancel();
        if !finished.load(Ordering::Acquire) {
            on_cancel();
        }
    })
}

impl<T: Send + 'static> EventStream<T> {
    /// Calls `f` with every event before forwarding it.
    pub fn on_each(&self, f: impl Fn(&T) + Send + Sync + 'static) -> EventStream<T> {
        self.map(move |event| {
            f(&event);
            event
        })
    }

    /// Calls `f` when the consumer cancels before the stream completed.
    pub fn do_on_cancel(&self, f: impl Fn() + Send + Sync + 'static) -> EventStream<T> {
        let upstream = self.clone();
        let on_cancel: Arc<dyn Fn() + Send + Sync> = Arc::new(f);
        EventStream::new(move |source: StreamSource<T>| {
            let holder = Arc::new(SubscriptionHolder::new());
            let finished = Arc::new(AtomicBool::new(false));
            source.set_subscription(cancel_hook(
                Arc::clone(&holder),
                Arc::clone(&finished),
                Arc::clone(&on_cancel),
            ));

            let (out, done) = (source.clone(), source.clone());
            upstream.subscribe_into(
                &*holder,
                Arc::new(FnSink::new(
                    move |event: T| out.emit_event(event),
                    move || {
                        finished.store(true, Ordering::Release);
                        done.complete();
                    },
                )),
            );
        })
    }
}

impl<T: Send + 'static> Eventual<T> {
    /// Calls `f` when the consumer cancels before the value arrived.
    pub fn do_on_cancel(&self, f: impl Fn() + Send + Sync + 'static) -> Eventual<T> {
        let upstream = self.clone();
        let on_cancel: Arc<dyn Fn() + Send + Sync> = Arc::new(f);
        Eventual::new(move |source: EventualSource<T>| {
            let holder = Arc::new(SubscriptionHolder::new());
            let finished = Arc::new(AtomicBool::new(false));
            source.set_subscription(cancel_hook(
                Arc::clone(&holder),
                Arc::clone(&finished),
                Arc::clone(&on_cancel),
            ));

            let out = source.clone();
            upstream.subscribe_into(&*holder, move |value| {
                finished.store(true, Ordering::Release);
                out.complete(value);
            });
        })
    }
}
