//! # Replaceable single-slot subscription container.
//!
//! [`SubscriptionHolder`] owns at most one live [`Subscription`]. Operators use
//! it to track "the current upstream": replacing the held subscription cancels
//! the previous one, and once the holder itself is cancelled every newly
//! assigned subscription is cancelled on arrival instead of being retained.
//!
//! ```text
//! replace(a) ──► holds a
//! replace(b) ──► a.cancel(), holds b
//! cancel()   ──► b.cancel(), holder cancelled
//! replace(c) ──► c.cancel() immediately
//! ```

use parking_lot::Mutex;

use super::subscription::{Cancel, Subscription};

#[derive(Default)]
struct HolderState {
    current: Option<Subscription>,
    cancelled: bool,
}

/// Mutable container for one replaceable subscription.
#[derive(Default)]
pub struct SubscriptionHolder {
    state: Mutex<HolderState>,
}

impl SubscriptionHolder {
    /// Creates an empty, live holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in `next`, cancelling the previously held subscription.
    ///
    /// If the holder was already cancelled, `next` is cancelled immediately.
    pub fn replace(&self, next: Subscription) {
        let previous = {
            let mut state = self.state.lock();
            if state.cancelled {
                None
            } else {
                Some(state.current.replace(next.clone()))
            }
        };
        match previous {
            // Holder already cancelled: never retain `next`.
            None => next.cancel(),
            Some(Some(previous)) if !previous.ptr_eq(&next) => previous.cancel(),
            Some(_) => {}
        }
    }

    /// Cancels the held subscription but keeps the holder live.
    pub fn clear(&self) {
        let previous = self.state.lock().current.take();
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    /// Cancels the held subscription and every future one.
    pub fn cancel(&self) {
        let previous = {
            let mut state = self.state.lock();
            state.cancelled = true;
            state.current.take()
        };
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    /// `true` if the holder was cancelled or its current subscription is.
    pub fn is_cancelled(&self) -> bool {
        let state = self.state.lock();
        state.cancelled || state.current.as_ref().is_some_and(Subscription::is_cancelled)
    }
}

impl Cancel for SubscriptionHolder {
    fn cancel(&self) {
        SubscriptionHolder::cancel(self);
    }

    fn is_cancelled(&self) -> bool {
        SubscriptionHolder::is_cancelled(self)
    }
}
