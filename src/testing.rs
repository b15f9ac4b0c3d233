//! Test probes: fake upstream producers that expose their sources and count
//! subscriptions and release calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::eventual::{Eventual, EventualSource};
use crate::stream::{EventStream, FnSink, Sink, StreamSource};
use crate::subscription::Subscription;

/// Pending eventual recording every subscription it serves.
pub(crate) struct Probe<T> {
    pub(crate) eventual: Eventual<T>,
    pub(crate) sources: Arc<Mutex<Vec<EventualSource<T>>>>,
    pub(crate) released: Arc<AtomicUsize>,
}

impl<T: Send + 'static> Probe<T> {
    pub(crate) fn subscriptions(&self) -> usize {
        self.sources.lock().len()
    }

    pub(crate) fn source(&self, index: usize) -> EventualSource<T> {
        self.sources.lock()[index].clone()
    }

    pub(crate) fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

pub(crate) fn probe<T: Send + 'static>() -> Probe<T> {
    let sources = Arc::new(Mutex::new(Vec::new()));
    let released = Arc::new(AtomicUsize::new(0));
    let (s, r) = (Arc::clone(&sources), Arc::clone(&released));
    let eventual = Eventual::new(move |source: EventualSource<T>| {
        let r = Arc::clone(&r);
        source.set_subscription(Subscription::create(move || {
            r.fetch_add(1, Ordering::SeqCst);
        }));
        s.lock().push(source);
    });
    Probe {
        eventual,
        sources,
        released,
    }
}

/// Pending stream recording every subscription it serves.
pub(crate) struct StreamProbe<T> {
    pub(crate) stream: EventStream<T>,
    pub(crate) sources: Arc<Mutex<Vec<StreamSource<T>>>>,
    pub(crate) released: Arc<AtomicUsize>,
}

impl<T: Send + 'static> StreamProbe<T> {
    pub(crate) fn subscriptions(&self) -> usize {
        self.sources.lock().len()
    }

    pub(crate) fn source(&self, index: usize) -> StreamSource<T> {
        self.sources.lock()[index].clone()
    }

    pub(crate) fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

pub(crate) fn stream_probe<T: Send + 'static>() -> StreamProbe<T> {
    let sources = Arc::new(Mutex::new(Vec::new()));
    let released = Arc::new(AtomicUsize::new(0));
    let (s, r) = (Arc::clone(&sources), Arc::clone(&released));
    let stream = EventStream::new(move |source: StreamSource<T>| {
        let r = Arc::clone(&r);
        source.set_subscription(Subscription::create(move || {
            r.fetch_add(1, Ordering::SeqCst);
        }));
        s.lock().push(source);
    });
    StreamProbe {
        stream,
        sources,
        released,
    }
}

/// Records events and completions delivered to a consumer.
pub(crate) struct Recorder<T> {
    pub(crate) events: Arc<Mutex<Vec<T>>>,
    pub(crate) completions: Arc<AtomicUsize>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub(crate) fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            completions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn sink(&self) -> Arc<dyn Sink<T>> {
        let events = Arc::clone(&self.events);
        let completions = Arc::clone(&self.completions);
        Arc::new(FnSink::new(
            move |event| events.lock().push(event),
            move || {
                completions.fetch_add(1, Ordering::SeqCst);
            },
        ))
    }

    pub(crate) fn subscribe(&self, stream: &EventStream<T>) -> Subscription {
        stream.subscribe_sink(self.sink())
    }

    pub(crate) fn events(&self) -> Vec<T> {
        self.events.lock().clone()
    }

    pub(crate) fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}
