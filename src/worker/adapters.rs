//! # Thread-hopping adapters.
//!
//! ```text
//! from_worker(w, f)   f() runs on w; skipped if cancelled before it ran
//! subscribe_on(w)     upstream builder runs on w
//! deliver_on(w)       downstream callbacks run on w, one at a time, in order
//! ```
//!
//! `deliver_on` uses one serial queue per subscription, so event order is
//! kept even on a multi-threaded worker. Cancelling still takes effect
//! immediately: queued deliveries of a cancelled subscription are no-ops.

use std::sync::Arc;

use crate::eventual::{Eventual, EventualSource};
use crate::stream::{EventStream, FnSink, StreamSource};

use super::serial::SerialQueue;
use super::worker::Worker;

fn shared(worker: impl Worker) -> Arc<dyn Worker> {
    Arc::new(worker)
}

impl<T: Send + 'static> Eventual<T> {
    /// Computes `f()` on `worker`, once per subscription.
    pub fn from_worker(worker: impl Worker, f: impl Fn() -> T + Send + Sync + 'static) -> Self {
        let worker = shared(worker);
        let f = Arc::new(f);
        Eventual::new(move |source: EventualSource<T>| {
            let f = Arc::clone(&f);
            worker.execute(Box::new(move || {
                if !source.is_cancelled() {
                    source.complete(f());
                }
            }));
        })
    }

    /// Connects the upstream on `worker`.
    pub fn subscribe_on(&self, worker: impl Worker) -> Eventual<T> {
        let upstream = self.clone();
        let worker = shared(worker);
        Eventual::new(move |source: EventualSource<T>| {
            let upstream = upstream.clone();
            worker.execute(Box::new(move || {
                if source.is_cancelled() {
                    return;
                }
                let out = source.clone();
                upstream.subscribe_into(&source, move |value| out.complete(value));
            }));
        })
    }

    /// Delivers the value on `worker`.
    pub fn deliver_on(&self, worker: impl Worker) -> Eventual<T> {
        let upstream = self.clone();
        let worker = shared(worker);
        Eventual::new(move |source: EventualSource<T>| {
            let queue = SerialQueue::new(Arc::clone(&worker));
            let out = source.clone();
            upstream.subscribe_into(&source, move |value| {
                queue.push(Box::new(move || out.complete(value)));
            });
        })
    }
}

impl<T: Send + 'static> EventStream<T> {
    /// Connects the upstream on `worker`.
    pub fn subscribe_on(&self, worker: impl Worker) -> EventStream<T> {
        let upstream = self.clone();
        let worker = shared(worker);
        EventStream::new(move |source: StreamSource<T>| {
            let upstream = upstream.clone();
            worker.execute(Box::new(move || {
                if source.is_cancelled() {
                    return;
                }
                upstream.subscribe_into(&source, source.relay());
            }));
        })
    }

    /// Delivers events and completion on `worker`, preserving order.
    pub fn deliver_on(&self, worker: impl Worker) -> EventStream<T> {
        let upstream = self.clone();
        let worker = shared(worker);
        EventStream::new(move |source: StreamSource<T>| {
            let queue = SerialQueue::new(Arc::clone(&worker));
            let (events, done) = (Arc::clone(&queue), queue);
            let (out, end) = (source.clone(), source.clone());
            upstream.subscribe_into(
                &source,
                Arc::new(FnSink::new(
                    move |event: T| {
                        let out = out.clone();
                        events.push(Box::new(move || out.emit_event(event)));
                    },
                    move || {
                        let end = end.clone();
                        done.push(Box::new(move || end.complete()));
                    },
                )),
            );
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::events_of;
    use crate::testing::probe;
    use crate::worker::{InlineWorker, WorkerConfig, WorkerPool};
    use std::thread;
    use std::time::Duration;

    fn pool() -> WorkerPool {
        WorkerPool::new(WorkerConfig {
            worker_threads: 4,
            thread_name: "adapter-test".into(),
            ..WorkerConfig::default()
        })
        .unwrap()
    }

    fn thread_name() -> Option<String> {
        thread::current().name().map(str::to_string)
    }

    #[test]
    fn from_worker_computes_on_worker_thread() {
        let pool = pool();
        let name = Eventual::from_worker(pool.blocking_worker(), thread_name).get_blocking();
        assert_eq!(name, Ok(Some("adapter-test".to_string())));
        pool.shutdown();
    }

    #[test]
    fn from_worker_skips_cancelled_job() {
        #[derive(Default)]
        struct Deferred(parking_lot::Mutex<Vec<crate::worker::Job>>);
        impl Worker for Deferred {
            fn execute(&self, job: crate::worker::Job) {
                self.0.lock().push(job);
            }
        }

        let deferred = Arc::new(Deferred::default());
        let runs = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let sub = Eventual::from_worker(Arc::clone(&deferred), move || {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
        })
        .subscribe(|_| {});
        sub.cancel();
        for job in deferred.0.lock().drain(..) {
            job();
        }
        assert_eq!(runs.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn deliver_on_keeps_event_order() {
        let pool = pool();
        let collected = events_of(0..200)
            .deliver_on(pool.worker())
            .collect()
            .get_blocking_timeout(Duration::from_secs(5));
        assert_eq!(collected, Ok((0..200).collect::<Vec<_>>()));
        pool.shutdown();
    }

    #[test]
    fn deliver_on_moves_value_to_worker() {
        let pool = pool();
        let name = Eventual::from_fn(|| 1)
            .deliver_on(pool.worker())
            .map(|_| thread_name())
            .get_blocking();
        assert_eq!(name, Ok(Some("adapter-test".to_string())));
        pool.shutdown();
    }

    #[test]
    fn subscribe_on_runs_builder_on_worker() {
        let pool = pool();
        let name = Eventual::from_fn(thread_name)
            .subscribe_on(pool.blocking_worker())
            .get_blocking();
        assert_eq!(name, Ok(Some("adapter-test".to_string())));

        let events = EventStream::from_iter(|| thread_name())
            .subscribe_on(pool.worker())
            .collect()
            .get_blocking();
        assert_eq!(events, Ok(vec!["adapter-test".to_string()]));
        pool.shutdown();
    }

    #[test]
    fn inline_adapters_are_transparent() {
        let p = probe::<u8>();
        let sub = p.eventual.subscribe_on(InlineWorker).deliver_on(InlineWorker).subscribe(|_| {});
        assert_eq!(p.subscriptions(), 1);
        sub.cancel();
        assert_eq!(p.released(), 1);
    }
}
