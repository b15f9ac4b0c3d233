//! # Imperative multi-subscriber source.
//!
//! [`BroadcastingEventSource`] is a hot producer: application code calls
//! [`emit_event`](BroadcastingEventSource::emit_event) and every currently
//! subscribed consumer receives the event synchronously, on the caller's
//! thread.
//!
//! ## Architecture
//! ```text
//! emit_event(v) ──► lock: record replay, snapshot ──► unlock ──► member.deliver(v.clone())
//!                                 ▲
//! events().subscribe() ── register ┤
//! subscription.cancel() ── remove(id)
//! ```
//!
//! ## Rules
//! - No lock is held while subscriber callbacks run: callbacks may emit,
//!   subscribe or cancel on any source, from any thread.
//! - The registry is copy-on-iterate: a subscriber added or removed while an
//!   emission is in flight takes effect from the next emission.
//! - Events from one emitting thread reach each subscriber in emission
//!   order. Concurrent emitters are not ordered against each other.
//! - A member registered with a replay value queues signals until the replay
//!   was delivered, so a replay never arrives after a newer event.
//! - After `complete`, emissions are ignored and new subscribers complete
//!   immediately.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use crate::stream::{EventStream, StreamSource};
use crate::subscription::Subscription;

/// Value a registry hands to every new subscriber before live events.
pub(crate) trait Replay<T>: Send + 'static {
    /// Observes an emitted event, under the registry lock.
    fn record(&mut self, event: &T);

    fn replay(&self) -> Option<T>;
}

impl<T> Replay<T> for () {
    fn record(&mut self, _event: &T) {}

    fn replay(&self) -> Option<T> {
        None
    }
}

enum Signal<T> {
    Event(T),
    Complete,
}

/// One registered subscriber.
///
/// `backlog` is `Some` while the replay value is being delivered; signals
/// arriving meanwhile queue there and are flushed right after it.
struct Member<T> {
    source: StreamSource<T>,
    backlog: Mutex<Option<VecDeque<Signal<T>>>>,
}

impl<T: Send + 'static> Member<T> {
    fn new(source: StreamSource<T>, replaying: bool) -> Arc<Self> {
        Arc::new(Self {
            source,
            backlog: Mutex::new(replaying.then(VecDeque::new)),
        })
    }

    fn deliver(&self, signal: Signal<T>) {
        {
            let mut backlog = self.backlog.lock();
            if let Some(queue) = backlog.as_mut() {
                queue.push_back(signal);
                return;
            }
        }
        self.forward(signal);
    }

    fn forward(&self, signal: Signal<T>) {
        match signal {
            Signal::Event(event) => self.source.emit_event(event),
            Signal::Complete => self.source.complete(),
        }
    }

    /// Delivers `value`, then everything queued behind it, then goes live.
    fn replay(&self, value: T) {
        self.source.emit_event(value);
        loop {
            let next = {
                let mut backlog = self.backlog.lock();
                let next = backlog.as_mut().and_then(VecDeque::pop_front);
                if next.is_none() {
                    *backlog = None;
                }
                next
            };
            match next {
                Some(signal) => self.forward(signal),
                None => return,
            }
        }
    }
}

struct RegistryState<T, R> {
    next_id: u64,
    subscribers: Vec<(u64, Arc<Member<T>>)>,
    completed: bool,
    replay: R,
}

/// Subscriber set shared by a source and its subscriptions.
pub(crate) struct Registry<T, R = ()> {
    state: Mutex<RegistryState<T, R>>,
}

impl<T: Clone + Send + 'static, R: Replay<T>> Registry<T, R> {
    pub(crate) fn new(replay: R) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(RegistryState {
                next_id: 0,
                subscribers: Vec::new(),
                completed: false,
                replay,
            }),
        })
    }

    /// Adds `source` to the subscriber set and delivers the replay value.
    ///
    /// On a completed registry the replay value (if any) is followed by
    /// completion instead.
    pub(crate) fn register(self: &Arc<Self>, source: StreamSource<T>) {
        let mut state = self.state.lock();
        let replay = state.replay.replay();
        if state.completed {
            drop(state);
            if let Some(value) = replay {
                source.emit_event(value);
            }
            source.complete();
            return;
        }
        let id = state.next_id;
        state.next_id += 1;
        let member = Member::new(source.clone(), replay.is_some());
        state.subscribers.push((id, Arc::clone(&member)));
        drop(state);

        trace!(id, "subscriber registered");
        let registry: Weak<Self> = Arc::downgrade(self);
        source.set_subscription(Subscription::create(move || {
            if let Some(registry) = registry.upgrade() {
                registry.remove(id);
            }
        }));
        if let Some(value) = replay {
            member.replay(value);
        }
    }

    fn remove(&self, id: u64) {
        let removed = {
            let mut state = self.state.lock();
            let before = state.subscribers.len();
            state.subscribers.retain(|(sub_id, _)| *sub_id != id);
            before != state.subscribers.len()
        };
        if removed {
            trace!(id, "subscriber removed");
        }
    }

    pub(crate) fn emit(&self, event: T) {
        let subscribers: Vec<_> = {
            let mut state = self.state.lock();
            if state.completed {
                return;
            }
            state.replay.record(&event);
            state.subscribers.iter().map(|(_, m)| Arc::clone(m)).collect()
        };
        for member in subscribers {
            member.deliver(Signal::Event(event.clone()));
        }
    }

    pub(crate) fn complete(&self) {
        let subscribers = {
            let mut state = self.state.lock();
            if state.completed {
                return;
            }
            state.completed = true;
            std::mem::take(&mut state.subscribers)
        };
        trace!(subscribers = subscribers.len(), "source completed");
        for (_, member) in subscribers {
            member.deliver(Signal::Complete);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.state.lock().completed
    }

    /// Reads the replay state under the registry lock.
    pub(crate) fn with_replay<V>(&self, read: impl FnOnce(&R) -> V) -> V {
        read(&self.state.lock().replay)
    }
}

/// Hot source fanning events out to every current subscriber.
///
/// Cloning yields another handle to the same source.
pub struct BroadcastingEventSource<T> {
    registry: Arc<Registry<T>>,
}

impl<T> Clone for BroadcastingEventSource<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T: Clone + Send + 'static> Default for BroadcastingEventSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BroadcastingEventSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BroadcastingEventSource").finish_non_exhaustive()
    }
}

impl<T: Clone + Send + 'static> BroadcastingEventSource<T> {
    /// Creates a source without subscribers.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(()),
        }
    }

    /// Stream view: every subscription joins the subscriber set.
    pub fn events(&self) -> EventStream<T> {
        let registry = Arc::clone(&self.registry);
        EventStream::new(move |source| registry.register(source))
    }

    /// Delivers `event` to every current subscriber.
    pub fn emit_event(&self, event: T) {
        self.registry.emit(event);
    }

    /// Completes every current subscriber and closes the source.
    pub fn complete(&self) {
        self.registry.complete();
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_completed(&self) -> bool {
        self.registry.is_completed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;

    #[test]
    fn fans_out_to_current_subscribers() {
        let source = BroadcastingEventSource::new();
        let early = Recorder::new();
        early.subscribe(&source.events());
        source.emit_event(1);

        let late = Recorder::new();
        late.subscribe(&source.events());
        source.emit_event(2);

        assert_eq!(early.events(), vec![1, 2]);
        assert_eq!(late.events(), vec![2]);
        assert_eq!(source.subscriber_count(), 2);
    }

    #[test]
    fn cancel_removes_only_that_subscriber() {
        let source = BroadcastingEventSource::new();
        let kept = Recorder::new();
        let dropped = Recorder::new();
        kept.subscribe(&source.events());
        let sub = dropped.subscribe(&source.events());

        sub.cancel();
        source.emit_event("x");

        assert_eq!(source.subscriber_count(), 1);
        assert_eq!(kept.events(), vec!["x"]);
        assert!(dropped.events().is_empty());
    }

    #[test]
    fn complete_closes_source() {
        let source = BroadcastingEventSource::new();
        let recorder = Recorder::new();
        recorder.subscribe(&source.events());
        source.complete();
        source.complete();
        source.emit_event(5);

        assert_eq!(recorder.completions(), 1);
        assert!(recorder.events().is_empty());
        assert!(source.is_completed());
        assert_eq!(source.subscriber_count(), 0);

        let late = Recorder::<i32>::new();
        let sub = late.subscribe(&source.events());
        assert_eq!(late.completions(), 1);
        assert!(sub.is_cancelled());
    }

    #[test]
    fn callbacks_may_emit_reentrantly() {
        let source = BroadcastingEventSource::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (out, again) = (Arc::clone(&seen), source.clone());
        source.events().for_each(move |v: u8| {
            out.lock().push(v);
            if v == 1 {
                again.emit_event(2);
            }
        });
        source.emit_event(1);
        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[test]
    fn subscribing_during_emission_applies_to_next_event() {
        let source = BroadcastingEventSource::new();
        let late = Arc::new(Recorder::new());
        let (handle, recorder) = (source.clone(), Arc::clone(&late));
        let joined = Arc::new(Mutex::new(false));
        source.events().for_each(move |_: u8| {
            let mut joined = joined.lock();
            if !*joined {
                *joined = true;
                recorder.subscribe(&handle.events());
            }
        });

        source.emit_event(1);
        source.emit_event(2);
        assert_eq!(late.events(), vec![2]);
    }

    #[test]
    fn concurrent_emitters_deliver_every_event() {
        let source = BroadcastingEventSource::new();
        let recorder = Recorder::new();
        recorder.subscribe(&source.events());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let source = source.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        source.emit_event(t * 100 + i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut events = recorder.events();
        events.sort_unstable();
        assert_eq!(events, (0..400).collect::<Vec<_>>());
    }

    #[test]
    fn handlers_emitting_into_each_other_from_two_threads() {
        const RELAYED: u32 = 1_000;
        let x = BroadcastingEventSource::new();
        let y = BroadcastingEventSource::new();
        let on_x = Recorder::new();
        let on_y = Recorder::new();
        on_x.subscribe(&x.events());
        on_y.subscribe(&y.events());

        let to_y = y.clone();
        x.events().for_each(move |v: u32| {
            if v < RELAYED {
                to_y.emit_event(v + RELAYED);
            }
        });
        let to_x = x.clone();
        y.events().for_each(move |v: u32| {
            if v < RELAYED {
                to_x.emit_event(v + RELAYED);
            }
        });

        let (done_tx, done_rx) = std::sync::mpsc::channel();
        for source in [x.clone(), y.clone()] {
            let done = done_tx.clone();
            std::thread::spawn(move || {
                for v in 0..200 {
                    source.emit_event(v);
                }
                let _ = done.send(());
            });
        }
        for _ in 0..2 {
            done_rx
                .recv_timeout(std::time::Duration::from_secs(5))
                .expect("emitters finish");
        }

        assert_eq!(on_x.events().len(), 400);
        assert_eq!(on_y.events().len(), 400);
    }
}
