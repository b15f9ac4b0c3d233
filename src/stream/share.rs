//! # Sharing one upstream subscription inside a pipeline.
//!
//! `broadcast(block)` hands `block` a hot view of this stream. Whatever
//! `block` derives from that view (several branches merged back together,
//! say) is driven by a **single** upstream subscription per downstream
//! subscription:
//!
//! ```text
//! upstream ──► hub (BroadcastingEventSource) ──► branch a ─┐
//!                                            └─► branch b ─┴─► block result ──► sink
//! ```
//!
//! The derived pipeline is connected first, the upstream last, so branches
//! never miss events emitted synchronously while connecting.

use std::sync::Arc;

use crate::sources::BroadcastingEventSource;
use crate::subscription::{CompositeSubscription, Subscription};

use super::sink::FnSink;
use super::stream::{EventStream, StreamSource};

impl<T: Clone + Send + 'static> EventStream<T> {
    /// Builds a pipeline from a shared view of this stream.
    pub fn broadcast<R: Send + 'static>(
        &self,
        block: impl Fn(&EventStream<T>) -> EventStream<R> + Send + Sync + 'static,
    ) -> EventStream<R> {
        let upstream = self.clone();
        let block = Arc::new(block);
        EventStream::new(move |source: StreamSource<R>| {
            let parts = Arc::new(CompositeSubscription::new());
            source.set_subscription(Subscription::from_cancel(parts.clone()));

            let hub = BroadcastingEventSource::new();
            block(&hub.events()).subscribe_into(&*parts, source.relay());
            if source.is_cancelled() {
                return;
            }

            let (events, done) = (hub.clone(), hub);
            upstream.subscribe_into(
                &*parts,
                Arc::new(FnSink::new(
                    move |event: T| events.emit_event(event),
                    move || done.complete(),
                )),
            );
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::events_of;
    use crate::testing::{Recorder, stream_probe};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn branches_share_one_upstream_subscription() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let upstream = EventStream::from_iter(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            vec![1, 2, 3]
        });

        let recorder = Recorder::new();
        recorder.subscribe(&upstream.broadcast(|shared| {
            shared.map(|v| v * 10).merge_with(&shared.filter(|v| v % 2 == 1))
        }));

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.events(), vec![10, 1, 20, 30, 3]);
        assert_eq!(recorder.completions(), 1);
    }

    #[test]
    fn cancel_releases_upstream() {
        let p = stream_probe::<u8>();
        let sub = p.stream.broadcast(|shared| shared.map(|v| v + 1)).for_each(|_| {});
        assert_eq!(p.subscriptions(), 1);
        sub.cancel();
        assert_eq!(p.released(), 1);
    }

    #[test]
    fn early_completion_of_block_skips_upstream() {
        let p = stream_probe::<u8>();
        let recorder = Recorder::<u8>::new();
        recorder.subscribe(&p.stream.broadcast(|_| EventStream::empty()));
        assert_eq!(recorder.completions(), 1);
        assert_eq!(p.subscriptions(), 0);
    }

    #[test]
    fn each_subscription_gets_its_own_hub() {
        let stream = events_of(vec![4, 5]).broadcast(|shared| shared.clone());
        for _ in 0..2 {
            let recorder = Recorder::new();
            recorder.subscribe(&stream);
            assert_eq!(recorder.events(), vec![4, 5]);
        }
    }
}
