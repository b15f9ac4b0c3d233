//! # Subscriptions: ownership of released-on-demand resources.
//!
//! Every `subscribe` call in this crate yields a [`Subscription`]. Operators
//! track their upstream handles with two containers:
//!
//! ```text
//! Subscription           one resource, idempotent cancel
//! SubscriptionHolder     one replaceable slot (map, and_then, switch_map)
//! CompositeSubscription  many slots          (zip, race, flat_map, merge)
//! ```
//!
//! All three implement [`Cancel`], so a container can itself be handed out as
//! a [`Subscription`] via [`Subscription::from_cancel`].

mod composite;
mod holder;
#[allow(clippy::module_inception)]
mod subscription;

pub use composite::CompositeSubscription;
pub use holder::SubscriptionHolder;
pub use subscription::{Cancel, Subscription, SubscriptionGuard};
