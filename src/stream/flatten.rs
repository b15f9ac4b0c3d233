//! # Higher-order and fan-in operators.
//!
//! ```text
//! flat_map    every inner stream live at once; completes when the outer
//!             and every spawned inner completed
//! switch_map  only the latest inner stream is live; completes when the
//!             outer and the current inner completed
//! merge       every source live at once; completes when all completed
//! ```
//!
//! Cancelling the result cancels the outer stream and every live inner
//! stream. Completion bookkeeping is updated atomically so that exactly one
//! callback observes "last one done".

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::subscription::{CompositeSubscription, Subscription, SubscriptionHolder};

use super::sink::FnSink;
use super::stream::{EventStream, SharedSink, StreamSource};

/// Live-stream counter of one `flat_map`/`merge` subscription.
///
/// Starts at the number of streams known up front; the source completes
/// when the count drops to zero.
struct Pending<R> {
    live: AtomicUsize,
    out: StreamSource<R>,
}

impl<R: Send + 'static> Pending<R> {
    fn new(live: usize, out: StreamSource<R>) -> Arc<Self> {
        Arc::new(Self {
            live: AtomicUsize::new(live),
            out,
        })
    }

    fn spawned(&self) {
        self.live.fetch_add(1, Ordering::AcqRel);
    }

    fn finished(&self) {
        if self.live.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.out.complete();
        }
    }

    /// Sink relaying events of one member stream and counting its completion.
    fn member(self: &Arc<Self>) -> SharedSink<R> {
        let (events, done) = (self.out.clone(), Arc::clone(self));
        Arc::new(FnSink::new(
            move |event: R| events.emit_event(event),
            move || done.finished(),
        ))
    }
}

/// Generation bookkeeping of one `switch_map` subscription.
#[derive(Default)]
struct SwitchState {
    generation: u64,
    inner_live: bool,
    outer_done: bool,
}

impl<T: Send + 'static> EventStream<T> {
    /// Subscribes to `f(event)` for every event, keeping all inner streams live.
    pub fn flat_map<R: Send + 'static>(
        &self,
        f: impl Fn(T) -> EventStream<R> + Send + Sync + 'static,
    ) -> EventStream<R> {
        let upstream = self.clone();
        let f = Arc::new(f);
        EventStream::new(move |source: StreamSource<R>| {
            let live = Arc::new(CompositeSubscription::new());
            source.set_subscription(Subscription::from_cancel(live.clone()));
            // The outer stream counts as the first live member.
            let pending = Pending::new(1, source.clone());

            let (f, inners, spawn) = (Arc::clone(&f), Arc::clone(&live), Arc::clone(&pending));
            upstream.subscribe_into(
                &*live,
                Arc::new(FnSink::new(
                    move |event: T| {
                        let inner = f(event);
                        spawn.spawned();
                        inner.subscribe_into(&*inners, spawn.member());
                    },
                    move || pending.finished(),
                )),
            );
        })
    }

    /// Subscribes to `f(event)` for every event, cancelling the previous
    /// inner stream first.
    ///
    /// Events an inner stream emits after it was superseded are dropped.
    pub fn switch_map<R: Send + 'static>(
        &self,
        f: impl Fn(T) -> EventStream<R> + Send + Sync + 'static,
    ) -> EventStream<R> {
        let upstream = self.clone();
        let f = Arc::new(f);
        EventStream::new(move |source: StreamSource<R>| {
            let outer = Arc::new(SubscriptionHolder::new());
            let inner = Arc::new(SubscriptionHolder::new());
            let (o, i) = (Arc::clone(&outer), Arc::clone(&inner));
            source.set_subscription(Subscription::create(move || {
                o.cancel();
                i.cancel();
            }));
            let state = Arc::new(Mutex::new(SwitchState::default()));

            let (f, out, switch) = (Arc::clone(&f), source.clone(), Arc::clone(&state));
            let on_event = move |event: T| {
                let generation = {
                    let mut state = switch.lock();
                    state.generation += 1;
                    state.inner_live = true;
                    state.generation
                };
                inner.clear();
                let next = f(event);

                let (events, done) = (out.clone(), out.clone());
                let (current, finished) = (Arc::clone(&switch), Arc::clone(&switch));
                next.subscribe_into(
                    &*inner,
                    Arc::new(FnSink::new(
                        move |event: R| {
                            if current.lock().generation == generation {
                                events.emit_event(event);
                            }
                        },
                        move || {
                            let complete = {
                                let mut state = finished.lock();
                                if state.generation != generation {
                                    return;
                                }
                                state.inner_live = false;
                                state.outer_done
                            };
                            if complete {
                                done.complete();
                            }
                        },
                    )),
                );
            };

            let done = source.clone();
            let on_complete = move || {
                let complete = {
                    let mut state = state.lock();
                    state.outer_done = true;
                    !state.inner_live
                };
                if complete {
                    done.complete();
                }
            };

            upstream.subscribe_into(&*outer, Arc::new(FnSink::new(on_event, on_complete)));
        })
    }

    /// Merges this stream with `other`.
    pub fn merge_with(&self, other: &EventStream<T>) -> EventStream<T> {
        merge_events(vec![self.clone(), other.clone()])
    }
}

/// Forwards events of every stream as they arrive; completes once all
/// streams completed. An empty list completes immediately.
pub fn merge_events<T: Send + 'static>(streams: Vec<EventStream<T>>) -> EventStream<T> {
    EventStream::new(move |source: StreamSource<T>| {
        if streams.is_empty() {
            source.complete();
            return;
        }
        let inputs = Arc::new(CompositeSubscription::new());
        source.set_subscription(Subscription::from_cancel(inputs.clone()));
        let pending = Pending::new(streams.len(), source.clone());
        for stream in &streams {
            if source.is_cancelled() {
                break;
            }
            stream.subscribe_into(&*inputs, pending.member());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::BroadcastingEventSource;
    use crate::stream::events_of;
    use crate::testing::{Recorder, StreamProbe, stream_probe};

    /// Outer probe plus one inner probe per index, selected by the event.
    fn nested() -> (StreamProbe<usize>, Arc<Vec<StreamProbe<u32>>>) {
        (stream_probe(), Arc::new((0..3).map(|_| stream_probe()).collect()))
    }

    #[test]
    fn flat_map_completes_after_outer_without_inners() {
        let (outer, _) = nested();
        let recorder = Recorder::<u32>::new();
        recorder.subscribe(&outer.stream.flat_map(|_| EventStream::never()));
        outer.source(0).complete();
        assert_eq!(recorder.completions(), 1);
    }

    #[test]
    fn flat_map_waits_for_single_inner() {
        let (outer, inners) = nested();
        let pick = Arc::clone(&inners);
        let recorder = Recorder::new();
        recorder.subscribe(&outer.stream.flat_map(move |i| pick[i].stream.clone()));

        outer.source(0).emit_event(0);
        outer.source(0).complete();
        assert_eq!(recorder.completions(), 0);

        inners[0].source(0).emit_event(7);
        inners[0].source(0).complete();
        assert_eq!(recorder.events(), vec![7]);
        assert_eq!(recorder.completions(), 1);
    }

    #[test]
    fn flat_map_waits_for_every_live_inner() {
        let (outer, inners) = nested();
        let pick = Arc::clone(&inners);
        let recorder = Recorder::new();
        recorder.subscribe(&outer.stream.flat_map(move |i| pick[i].stream.clone()));

        outer.source(0).emit_event(0);
        outer.source(0).emit_event(1);
        inners[1].source(0).emit_event(10);
        inners[0].source(0).emit_event(20);
        inners[0].source(0).complete();
        outer.source(0).complete();
        assert_eq!(recorder.completions(), 0);

        inners[1].source(0).complete();
        assert_eq!(recorder.events(), vec![10, 20]);
        assert_eq!(recorder.completions(), 1);
    }

    #[test]
    fn flat_map_cancel_reaches_outer_and_inners() {
        let (outer, inners) = nested();
        let pick = Arc::clone(&inners);
        let sub = outer
            .stream
            .flat_map(move |i| pick[i].stream.clone())
            .for_each(|_| {});
        outer.source(0).emit_event(0);
        outer.source(0).emit_event(1);
        sub.cancel();

        assert_eq!(outer.released(), 1);
        assert_eq!(inners[0].released(), 1);
        assert_eq!(inners[1].released(), 1);
    }

    #[test]
    fn flat_map_of_sync_streams() {
        let recorder = Recorder::new();
        recorder.subscribe(&events_of(vec![1, 2]).flat_map(|v| events_of(vec![v, v * 10])));
        assert_eq!(recorder.events(), vec![1, 10, 2, 20]);
        assert_eq!(recorder.completions(), 1);
    }

    #[test]
    fn switch_map_supersedes_previous_inner() {
        let (outer, inners) = nested();
        let pick = Arc::clone(&inners);
        let recorder = Recorder::new();
        recorder.subscribe(&outer.stream.switch_map(move |i| pick[i].stream.clone()));

        outer.source(0).emit_event(0);
        inners[0].source(0).emit_event(1);
        outer.source(0).emit_event(1);

        assert_eq!(inners[0].released(), 1);
        assert!(inners[0].source(0).is_cancelled());
        assert_eq!(inners[1].subscriptions(), 1);

        inners[0].source(0).emit_event(99);
        inners[1].source(0).emit_event(2);
        assert_eq!(recorder.events(), vec![1, 2]);
    }

    #[test]
    fn switch_map_completes_with_outer_and_current_inner() {
        let (outer, inners) = nested();
        let pick = Arc::clone(&inners);
        let recorder = Recorder::new();
        recorder.subscribe(&outer.stream.switch_map(move |i| pick[i].stream.clone()));

        outer.source(0).emit_event(0);
        outer.source(0).emit_event(1);
        outer.source(0).complete();
        assert_eq!(recorder.completions(), 0);

        inners[1].source(0).complete();
        assert_eq!(recorder.completions(), 1);
    }

    #[test]
    fn switch_map_cancel_releases_outer_and_inner() {
        let (outer, inners) = nested();
        let pick = Arc::clone(&inners);
        let sub = outer
            .stream
            .switch_map(move |i| pick[i].stream.clone())
            .for_each(|_| {});
        outer.source(0).emit_event(2);
        sub.cancel();
        assert_eq!(outer.released(), 1);
        assert_eq!(inners[2].released(), 1);
    }

    #[test]
    fn merge_preserves_emission_order() {
        let a = BroadcastingEventSource::new();
        let b = BroadcastingEventSource::new();
        let recorder = Recorder::new();
        recorder.subscribe(&a.events().merge_with(&b.events()));

        a.emit_event("a1");
        b.emit_event("b1");
        b.emit_event("b2");
        a.emit_event("a2");
        a.complete();
        assert_eq!(recorder.completions(), 0);
        b.complete();

        assert_eq!(recorder.events(), vec!["a1", "b1", "b2", "a2"]);
        assert_eq!(recorder.completions(), 1);
    }

    #[test]
    fn merge_cancel_and_empty() {
        let a = stream_probe::<u8>();
        let b = stream_probe::<u8>();
        let sub = merge_events(vec![a.stream.clone(), b.stream.clone()]).for_each(|_| {});
        sub.cancel();
        assert_eq!(a.released(), 1);
        assert_eq!(b.released(), 1);

        let empty = Recorder::<u8>::new();
        empty.subscribe(&merge_events(Vec::new()));
        assert_eq!(empty.completions(), 1);
    }

    /// Spawns one thread per source; each emits its index and completes,
    /// all released together.
    fn finish_concurrently(sources: &[BroadcastingEventSource<usize>]) {
        let barrier = Arc::new(std::sync::Barrier::new(sources.len()));
        let handles: Vec<_> = sources
            .iter()
            .enumerate()
            .map(|(i, source)| {
                let (source, barrier) = (source.clone(), Arc::clone(&barrier));
                std::thread::spawn(move || {
                    barrier.wait();
                    source.emit_event(i);
                    source.complete();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn flat_map_completes_once_when_inners_finish_on_many_threads() {
        for _ in 0..50 {
            let inners: Arc<Vec<BroadcastingEventSource<usize>>> =
                Arc::new((0..8).map(|_| BroadcastingEventSource::new()).collect());
            let pick = Arc::clone(&inners);
            let recorder = Recorder::new();
            recorder.subscribe(&events_of(0..8usize).flat_map(move |i| pick[i].events()));
            assert_eq!(recorder.completions(), 0);

            finish_concurrently(&inners);

            let mut events = recorder.events();
            events.sort_unstable();
            assert_eq!(events, (0..8).collect::<Vec<_>>());
            assert_eq!(recorder.completions(), 1);
        }
    }

    #[test]
    fn merge_completes_once_when_sources_finish_on_many_threads() {
        for _ in 0..50 {
            let sources: Vec<BroadcastingEventSource<usize>> =
                (0..8).map(|_| BroadcastingEventSource::new()).collect();
            let recorder = Recorder::new();
            recorder.subscribe(&merge_events(sources.iter().map(|s| s.events()).collect()));

            finish_concurrently(&sources);

            assert_eq!(recorder.events().len(), 8);
            assert_eq!(recorder.completions(), 1);
        }
    }
}
