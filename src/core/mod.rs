//! # Runtime internals shared by eventual values and streams.
//!
//! - [`Connection`] per-subscription state (sink slot, cancelled flag,
//!   upstream holder) behind every `subscribe` call.
//! - [`Attach`] the slot an operator registers an upstream subscription in
//!   **before** the upstream producer starts running.
//!
//! Registering before connecting is what lets a synchronous producer observe
//! a downstream cancellation that happens while it is still emitting
//! (e.g. `events_of(..).first()` stops after the first element).

mod connection;

pub(crate) use connection::Connection;

use crate::subscription::{CompositeSubscription, Subscription, SubscriptionHolder};

/// Destination for an upstream subscription handle.
pub(crate) trait Attach {
    fn attach(&self, sub: Subscription);
}

impl Attach for SubscriptionHolder {
    fn attach(&self, sub: Subscription) {
        self.replace(sub);
    }
}

impl Attach for CompositeSubscription {
    fn attach(&self, sub: Subscription) {
        self.add(sub);
    }
}
