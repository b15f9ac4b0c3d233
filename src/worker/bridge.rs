//! # Async bridges.
//!
//! ```text
//! Eventual<T>     ──.await / to_future()──► EventualFuture<T>: Future<Output = Result<T>>
//! EventStream<T>  ──into_stream()─────────► EventReceiver<T>: futures::Stream<Item = T>
//! Future          ──Eventual::from_future──► Eventual<T> (spawned, cancellable)
//! ```
//!
//! ## Rules
//! - Dropping an [`EventualFuture`] or [`EventReceiver`] cancels the
//!   underlying subscription.
//! - An eventual whose producer handles were all dropped without a value
//!   resolves to [`Error::Disconnected`].
//! - `from_future` spawns once per subscription; cancelling the subscription
//!   cancels the spawned task through a `CancellationToken`.

use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use futures::channel::{mpsc, oneshot};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::eventual::{Eventual, EventualSource};
use crate::stream::{EventStream, FnSink};
use crate::subscription::{Subscription, SubscriptionGuard};

/// Future resolving to the value of one [`Eventual`] subscription.
#[must_use = "futures do nothing unless awaited; dropping cancels the subscription"]
pub struct EventualFuture<T> {
    rx: oneshot::Receiver<T>,
    _guard: SubscriptionGuard,
}

impl<T> fmt::Debug for EventualFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventualFuture").finish_non_exhaustive()
    }
}

impl<T> Future for EventualFuture<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            .map(|value| value.map_err(|_| Error::Disconnected))
    }
}

/// Stream of the events of one [`EventStream`] subscription.
///
/// Ends when the stream completes or the subscription is cancelled.
#[must_use = "streams do nothing unless polled; dropping cancels the subscription"]
pub struct EventReceiver<T> {
    rx: mpsc::UnboundedReceiver<T>,
    guard: SubscriptionGuard,
}

impl<T> EventReceiver<T> {
    /// Cancels the subscription; already buffered events stay readable.
    pub fn close(&mut self) {
        self.guard.cancel();
    }
}

impl<T> fmt::Debug for EventReceiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventReceiver").finish_non_exhaustive()
    }
}

impl<T> Stream for EventReceiver<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        Pin::new(&mut self.get_mut().rx).poll_next(cx)
    }
}

impl<T: Send + 'static> Eventual<T> {
    /// Subscribes and returns a future of the value.
    pub fn to_future(&self) -> EventualFuture<T> {
        let (tx, rx) = oneshot::channel();
        let guard = self
            .subscribe(move |value| {
                let _ = tx.send(value);
            })
            .guard();
        EventualFuture { rx, _guard: guard }
    }

    /// Runs the future built by `factory` on `handle`, once per subscription.
    pub fn from_future<F, Fut>(handle: Handle, factory: F) -> Eventual<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Eventual::new(move |source: EventualSource<T>| {
            let token = CancellationToken::new();
            source.set_subscription(Subscription::from(token.clone()));
            if token.is_cancelled() {
                return;
            }
            let work = factory();
            handle.spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    value = work => source.complete(value),
                }
            });
        })
    }
}

impl<T: Send + 'static> IntoFuture for Eventual<T> {
    type Output = Result<T>;
    type IntoFuture = EventualFuture<T>;

    fn into_future(self) -> Self::IntoFuture {
        self.to_future()
    }
}

impl<T: Send + 'static> EventStream<T> {
    /// Subscribes and returns the events as a `futures::Stream`.
    pub fn into_stream(&self) -> EventReceiver<T> {
        let (tx, rx) = mpsc::unbounded();
        let done = tx.clone();
        let guard = self
            .subscribe_sink(std::sync::Arc::new(FnSink::new(
                move |event: T| {
                    let _ = tx.unbounded_send(event);
                },
                move || done.close_channel(),
            )))
            .guard();
        EventReceiver { rx, guard }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eventual::eventual_of;
    use crate::sources::BroadcastingEventSource;
    use crate::stream::events_of;
    use crate::testing::probe;
    use futures::StreamExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn eventual_can_be_awaited() {
        assert_eq!(eventual_of(3).map(|v| v * 2).await, Ok(6));
    }

    #[test]
    fn dropping_future_cancels_subscription() {
        let p = probe::<u8>();
        let future = p.eventual.to_future();
        assert_eq!(p.subscriptions(), 1);
        drop(future);
        assert_eq!(p.released(), 1);
    }

    #[tokio::test]
    async fn dropped_producer_resolves_disconnected() {
        struct DiscardJobs;
        impl crate::worker::Worker for DiscardJobs {
            fn execute(&self, job: crate::worker::Job) {
                drop(job);
            }
        }

        let value = Eventual::from_worker(DiscardJobs, || 1u8).await;
        assert_eq!(value, Err(Error::Disconnected));
    }

    #[tokio::test]
    async fn stream_bridge_yields_events_then_ends() {
        let items: Vec<_> = events_of(vec![1, 2, 3]).into_stream().collect().await;
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn stream_bridge_follows_hot_source() {
        let source = BroadcastingEventSource::new();
        let mut events = source.events().into_stream();
        source.emit_event("a");
        source.emit_event("b");
        assert_eq!(events.next().await, Some("a"));
        assert_eq!(events.next().await, Some("b"));

        events.close();
        assert_eq!(source.subscriber_count(), 0);
        assert_eq!(events.next().await, None);
    }

    #[tokio::test]
    async fn from_future_completes_with_output() {
        let value = Eventual::from_future(Handle::current(), || async { 5 }).await;
        assert_eq!(value, Ok(5));
    }

    #[tokio::test]
    async fn from_future_cancellation_drops_task() {
        struct DropFlag(Arc<AtomicBool>);
        impl Drop for DropFlag {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&dropped);
        let sub = Eventual::from_future(Handle::current(), move || {
            let guard = DropFlag(Arc::clone(&flag));
            async move {
                let _guard = guard;
                tokio::time::sleep(Duration::from_secs(3600)).await;
                1
            }
        })
        .subscribe(|_| {});

        sub.cancel();
        for _ in 0..100 {
            if dropped.load(Ordering::SeqCst) {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(dropped.load(Ordering::SeqCst));
    }
}
