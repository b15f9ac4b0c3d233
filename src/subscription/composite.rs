//! # Multi-slot subscription container.
//!
//! [`CompositeSubscription`] tracks any number of live upstream handles. It is
//! the cancellation point of fan-in operators (`zip`, `race`, `flat_map`,
//! `merge_with`): cancelling the composite cancels every tracked handle.
//!
//! ## Rules
//! - `add` on a cancelled composite cancels the new handle immediately.
//! - Members that already finished (cancelled) are pruned on `add`, so
//!   long-lived `flat_map`s do not accumulate dead handles.
//! - The composite reports itself cancelled only when it was cancelled
//!   explicitly or when every tracked member is cancelled.

use parking_lot::Mutex;

use super::subscription::{Cancel, Subscription};

#[derive(Default)]
struct CompositeState {
    members: Vec<Subscription>,
    cancelled: bool,
}

/// Container cancelling a set of subscriptions together.
#[derive(Default)]
pub struct CompositeSubscription {
    state: Mutex<CompositeState>,
}

impl CompositeSubscription {
    /// Creates an empty, live composite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks `sub`; cancels it right away if the composite is cancelled.
    pub fn add(&self, sub: Subscription) {
        {
            let mut state = self.state.lock();
            if !state.cancelled {
                state.members.retain(|m| !m.is_cancelled());
                state.members.push(sub);
                return;
            }
        }
        sub.cancel();
    }

    /// Cancels every tracked subscription and every future one.
    pub fn cancel(&self) {
        let members = {
            let mut state = self.state.lock();
            state.cancelled = true;
            std::mem::take(&mut state.members)
        };
        for member in members {
            member.cancel();
        }
    }

    /// `true` if cancelled explicitly or all tracked members are cancelled.
    pub fn is_cancelled(&self) -> bool {
        let state = self.state.lock();
        state.cancelled
            || (!state.members.is_empty() && state.members.iter().all(Subscription::is_cancelled))
    }

    /// Number of tracked members that are still live.
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .members
            .iter()
            .filter(|m| !m.is_cancelled())
            .count()
    }

    /// True if no live member is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cancel for CompositeSubscription {
    fn cancel(&self) {
        CompositeSubscription::cancel(self);
    }

    fn is_cancelled(&self) -> bool {
        CompositeSubscription::is_cancelled(self)
    }
}
