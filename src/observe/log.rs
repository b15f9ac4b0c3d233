//! # Logging decorators (feature `logging`).
//!
//! Pass-through decorators emitting `tracing` events at `debug` level. Each
//! record carries the caller's `tag`, plus the `event`/`value` where one
//! exists:
//!
//! ```text
//! log_each(tag)          event=<Debug>  "event"
//! log_result(tag)        value=<Debug>  "value"
//! log_subscription(tag)  "subscribed" | "completed" | "cancelled"
//! ```

use std::fmt::Debug;
use std::sync::Arc;

use tracing::debug;

use crate::eventual::{Eventual, EventualSource};
use crate::stream::{EventStream, FnSink, StreamSource};

impl<T: Debug + Send + 'static> EventStream<T> {
    /// Logs every event.
    pub fn log_each(&self, tag: &'static str) -> EventStream<T> {
        self.on_each(move |event| debug!(tag, event = ?event, "event"))
    }
}

impl<T: Send + 'static> EventStream<T> {
    /// Logs subscription, completion and consumer cancellation.
    pub fn log_subscription(&self, tag: &'static str) -> EventStream<T> {
        let upstream = self.do_on_cancel(move || debug!(tag, "cancelled"));
        EventStream::new(move |source: StreamSource<T>| {
            debug!(tag, "subscribed");
            let (out, done) = (source.clone(), source.clone());
            upstream.subscribe_into(
                &source,
                Arc::new(FnSink::new(
                    move |event: T| out.emit_event(event),
                    move || {
                        debug!(tag, "completed");
                        done.complete();
                    },
                )),
            );
        })
    }
}

impl<T: Debug + Send + 'static> Eventual<T> {
    /// Logs the value when it arrives.
    pub fn log_result(&self, tag: &'static str) -> Eventual<T> {
        self.map(move |value| {
            debug!(tag, value = ?value, "value");
            value
        })
    }
}

impl<T: Send + 'static> Eventual<T> {
    /// Logs subscription, completion and consumer cancellation.
    pub fn log_subscription(&self, tag: &'static str) -> Eventual<T> {
        let upstream = self.do_on_cancel(move || debug!(tag, "cancelled"));
        Eventual::new(move |source: EventualSource<T>| {
            debug!(tag, "subscribed");
            let out = source.clone();
            upstream.subscribe_into(&source, move |value| {
                debug!(tag, "completed");
                out.complete(value);
            });
        })
    }
}
