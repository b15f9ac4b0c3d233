//! # Stream → Eventual conversions.
//!
//! | Operator          | Result                  | Empty stream               |
//! |-------------------|-------------------------|----------------------------|
//! | `first`           | `Potential<T>`          | `None`                     |
//! | `first_or_error`  | `Eventual<Result<T>>`   | `Err(Error::NoSuchElement)`|
//! | `collect`         | `Eventual<Vec<T>>`      | `vec![]`                   |
//! | `completion`      | `Completable`           | fires on completion        |
//!
//! `first` and `first_or_error` cancel the stream right after its first
//! event; synchronous producers stop emitting at that point.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::eventual::{Completable, Eventual, EventualSource, Potential};

use super::sink::FnSink;
use super::stream::EventStream;

impl<T: Send + 'static> EventStream<T> {
    /// The first event, or `None` if the stream completes without one.
    pub fn first(&self) -> Potential<T> {
        let upstream = self.clone();
        Eventual::new(move |source: EventualSource<Option<T>>| {
            let (out, done) = (source.clone(), source.clone());
            upstream.subscribe_into(
                &source,
                Arc::new(FnSink::new(
                    move |event: T| out.complete(Some(event)),
                    move || done.complete(None),
                )),
            );
        })
    }

    /// The first event, or [`Error::NoSuchElement`] if the stream completes
    /// without one.
    pub fn first_or_error(&self) -> Eventual<Result<T>> {
        self.first().map(|first| first.ok_or(Error::NoSuchElement))
    }

    /// Every event, in order, once the stream completed.
    pub fn collect(&self) -> Eventual<Vec<T>> {
        let upstream = self.clone();
        Eventual::new(move |source: EventualSource<Vec<T>>| {
            let items = Arc::new(Mutex::new(Vec::new()));
            let (push, out) = (Arc::clone(&items), source.clone());
            upstream.subscribe_into(
                &source,
                Arc::new(FnSink::new(
                    move |event: T| push.lock().push(event),
                    move || {
                        let items = std::mem::take(&mut *items.lock());
                        out.complete(items);
                    },
                )),
            );
        })
    }

    /// Fires once the stream completed; events are ignored.
    pub fn completion(&self) -> Completable {
        let upstream = self.clone();
        Eventual::new(move |source: EventualSource<()>| {
            let out = source.clone();
            upstream.subscribe_into(
                &source,
                Arc::new(FnSink::new(|_: T| {}, move || out.complete(()))),
            );
        })
    }
}
