//! # Specializations: optional results and bare completion signals.
//!
//! - [`Potential<T>`] = `Eventual<Option<T>>`: completes with a value or with
//!   an explicit "no value" (`None`), which is distinct from never completing.
//! - [`Completable`] = `Eventual<()>`: a fire-once completion signal.

use super::combinators::zip;
use super::eventual::Eventual;

/// Eventual whose value may be absent.
pub type Potential<T> = Eventual<Option<T>>;

/// Value-less eventual used purely as a completion signal.
pub type Completable = Eventual<()>;

impl<T: Send + 'static> Eventual<Option<T>> {
    /// Keeps the value only if `predicate` holds; otherwise yields `None`.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Potential<T> {
        self.map(move |value| value.filter(|v| predicate(v)))
    }

    /// Transforms a present value; `None` passes through.
    pub fn map_some<R: Send + 'static>(
        &self,
        f: impl Fn(T) -> R + Send + Sync + 'static,
    ) -> Potential<R> {
        self.map(move |value| value.map(&f))
    }

    /// Substitutes `default` for a missing value.
    pub fn unwrap_or(&self, default: T) -> Eventual<T>
    where
        T: Clone + Sync,
    {
        self.map(move |value| value.unwrap_or_else(|| default.clone()))
    }

    /// A potential that completes immediately without a value.
    pub fn none() -> Self {
        Eventual::new(|source| source.complete(None))
    }
}

/// A potential that completes immediately with a clone of `value`.
pub fn potential_of<T>(value: Option<T>) -> Potential<T>
where
    T: Clone + Send + Sync + 'static,
{
    Eventual::new(move |source| source.complete(value.clone()))
}

impl Eventual<()> {
    /// Completes once every completable in `all` completed.
    pub fn all(all: Vec<Completable>) -> Completable {
        zip(all, |_| ())
    }

    /// Continues with `next` after this signal fires.
    pub fn then<R: Send + 'static>(&self, next: &Eventual<R>) -> Eventual<R> {
        let next = next.clone();
        self.and_then(move |()| next.clone())
    }
}

/// A completable that fires immediately.
pub fn completed() -> Completable {
    Eventual::new(|source| source.complete(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eventual::eventual_of;
    use crate::testing::probe;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn collect<T: Send + 'static>(eventual: &Eventual<T>) -> Arc<Mutex<Vec<T>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let out = Arc::clone(&seen);
        eventual.subscribe(move |v| out.lock().push(v));
        seen
    }

    #[test]
    fn filter_yields_value_or_none() {
        let kept = collect(&potential_of(Some(4)).filter(|v| v % 2 == 0));
        let dropped = collect(&potential_of(Some(3)).filter(|v| v % 2 == 0));
        assert_eq!(*kept.lock(), vec![Some(4)]);
        assert_eq!(*dropped.lock(), vec![None]);
    }

    #[test]
    fn filter_on_pending_source_does_not_complete() {
        let p = probe::<Option<u8>>();
        let seen = collect(&p.eventual.filter(|_| false));
        assert!(seen.lock().is_empty());
        p.source(0).complete(Some(1));
        assert_eq!(*seen.lock(), vec![None]);
    }

    #[test]
    fn map_some_and_unwrap_or() {
        let mapped = collect(&potential_of(Some(2)).map_some(|v| v * 3));
        assert_eq!(*mapped.lock(), vec![Some(6)]);
        let defaulted = collect(&Eventual::<Option<u8>>::none().unwrap_or(9));
        assert_eq!(*defaulted.lock(), vec![9]);
    }

    #[test]
    fn completables_combine() {
        let done = collect(&Completable::all(vec![completed(), completed()]).then(&eventual_of(1)));
        assert_eq!(*done.lock(), vec![1]);
    }

    #[test]
    fn all_waits_for_every_signal() {
        let p = probe::<()>();
        let done = collect(&Completable::all(vec![completed(), p.eventual.clone()]));
        assert!(done.lock().is_empty());
        p.source(0).complete(());
        assert_eq!(done.lock().len(), 1);
    }
}
