//! # Per-subscription state shared by producers and consumers.
//!
//! Every `subscribe` call allocates one [`Connection`]: the consumer's sink,
//! a cancelled flag and the holder for whatever the producer registers via
//! `set_subscription`. The producer side (`EventualSource` / `StreamSource`)
//! and the consumer's [`Subscription`] both point at it.
//!
//! ## Lifecycle
//! ```text
//! Active ──emit*──► Completed ─┐
//!    │                          ├──► cancelled (absorbing)
//!    └──────── cancel() ────────┘
//! ```
//!
//! ## Rules
//! - The sink is never invoked while the internal lock is held, so callbacks
//!   may cancel or emit re-entrantly.
//! - Completion takes the sink out of its slot: at most one completion.
//! - `cancel()` drops the sink and cancels the registered upstream exactly once.
//! - A terminal signal cancels through [`Finish`], so the upstream is
//!   released even when the sink panics.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::subscription::{Cancel, Subscription, SubscriptionHolder};

pub(crate) struct Connection<S> {
    cancelled: AtomicBool,
    sink: Mutex<Option<S>>,
    upstream: SubscriptionHolder,
}

impl<S: Send + 'static> Connection<S> {
    pub(crate) fn new(sink: S) -> Arc<Self> {
        Arc::new(Self {
            cancelled: AtomicBool::new(false),
            sink: Mutex::new(Some(sink)),
            upstream: SubscriptionHolder::new(),
        })
    }

    /// Consumer-facing handle sharing this connection's state.
    pub(crate) fn subscription(self: &Arc<Self>) -> Subscription {
        Subscription::from_cancel(Arc::clone(self) as Arc<dyn Cancel>)
    }

    /// Registers the producer's resources; replaces the previous registration.
    pub(crate) fn attach(&self, sub: Subscription) {
        self.upstream.replace(sub);
    }

    /// Guard that cancels this connection when dropped.
    pub(crate) fn finish(&self) -> Finish<'_, S> {
        Finish(self)
    }
}

impl<S> Connection<S> {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Removes the sink for a terminal signal. `None` once cancelled or completed.
    pub(crate) fn take_sink(&self) -> Option<S> {
        let mut slot = self.sink.lock();
        if self.is_cancelled() {
            return None;
        }
        slot.take()
    }
}

/// Cancels its connection on drop, unwinding included.
pub(crate) struct Finish<'a, S: Send + 'static>(&'a Connection<S>);

impl<S: Send + 'static> Drop for Finish<'_, S> {
    fn drop(&mut self) {
        Cancel::cancel(self.0);
    }
}

impl<S: Clone + Send + 'static> Connection<S> {
    /// Shared view of the sink for a non-terminal signal.
    pub(crate) fn sink(&self) -> Option<S> {
        let slot = self.sink.lock();
        if self.is_cancelled() {
            return None;
        }
        slot.clone()
    }
}

impl<S: Send + 'static> Cancel for Connection<S> {
    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let sink = self.sink.lock().take();
        drop(sink);
        self.upstream.cancel();
    }

    fn is_cancelled(&self) -> bool {
        Connection::is_cancelled(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_takes_sink_once() {
        let conn = Connection::new(7u32);
        assert_eq!(conn.take_sink(), Some(7));
        assert_eq!(conn.take_sink(), None);
    }

    #[test]
    fn cancel_drops_sink_and_upstream() {
        let conn = Connection::new(Arc::new(1u8));
        let upstream = Subscription::empty();
        conn.attach(upstream.clone());
        let handle = conn.subscription();

        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(upstream.is_cancelled());
        assert!(conn.sink().is_none());
    }

    #[test]
    fn finish_cancels_on_unwind() {
        let conn = Connection::new(());
        let upstream = Subscription::empty();
        conn.attach(upstream.clone());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _finish = conn.finish();
            panic!("sink failed");
        }));

        assert!(result.is_err());
        assert!(conn.is_cancelled());
        assert!(upstream.is_cancelled());
    }

    #[test]
    fn attach_after_cancel_is_cancelled() {
        let conn = Connection::new(());
        Cancel::cancel(&*conn);
        let late = Subscription::empty();
        conn.attach(late.clone());
        assert!(late.is_cancelled());
    }
}
