//! # Cancellable resource handles.
//!
//! [`Subscription`] is the handle every `subscribe` call returns. It owns the
//! right to release whatever the producer acquired for that subscriber.
//!
//! ## Rules
//! - `cancel()` is idempotent and safe to call concurrently; the release
//!   action runs **exactly once**.
//! - Once cancelled, `is_cancelled()` stays `true` forever.
//! - The release action is dropped right after it runs, so everything it
//!   captured becomes eligible for release.
//! - Cancellation never panics on its own; only a panicking release action can.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use eventual::Subscription;
//!
//! let released = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&released);
//! let sub = Subscription::create(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! sub.cancel();
//! sub.cancel();
//! assert!(sub.is_cancelled());
//! assert_eq!(released.load(Ordering::SeqCst), 1);
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Capability implemented by everything that can be cancelled.
///
/// ### Implementation requirements
/// - `cancel` must be idempotent and must not block on user callbacks
///   held under a lock.
/// - `is_cancelled` must become `true` no later than `cancel` returns.
pub trait Cancel: Send + Sync {
    /// Releases the underlying resource. Repeated calls are no-ops.
    fn cancel(&self);

    /// Returns `true` once the resource has been released.
    fn is_cancelled(&self) -> bool;
}

type ReleaseAction = Box<dyn FnOnce() + Send + 'static>;

/// Subscription around a one-shot release action.
struct ActionSubscription {
    cancelled: AtomicBool,
    action: Mutex<Option<ReleaseAction>>,
}

impl Cancel for ActionSubscription {
    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let action = self.action.lock().take();
        if let Some(action) = action {
            action();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Cheap, cloneable handle to a cancellable resource.
///
/// Clones share the same underlying state: cancelling one clone cancels all.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<dyn Cancel>,
}

impl Subscription {
    /// Builds a subscription that runs `action` on the first `cancel()`.
    pub fn create(action: impl FnOnce() + Send + 'static) -> Self {
        Self::from_cancel(Arc::new(ActionSubscription {
            cancelled: AtomicBool::new(false),
            action: Mutex::new(Some(Box::new(action))),
        }))
    }

    /// A live subscription with nothing to release.
    pub fn empty() -> Self {
        Self::from_cancel(Arc::new(ActionSubscription {
            cancelled: AtomicBool::new(false),
            action: Mutex::new(None),
        }))
    }

    /// A subscription that is already cancelled.
    pub fn cancelled() -> Self {
        Self::from_cancel(Arc::new(ActionSubscription {
            cancelled: AtomicBool::new(true),
            action: Mutex::new(None),
        }))
    }

    /// Wraps any [`Cancel`] implementation.
    pub fn from_cancel(inner: Arc<dyn Cancel>) -> Self {
        Self { inner }
    }

    /// Releases the resource. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// Returns `true` once released.
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Returns a guard that cancels this subscription when dropped.
    #[must_use = "dropping the guard cancels the subscription immediately"]
    pub fn guard(self) -> SubscriptionGuard {
        SubscriptionGuard { sub: Some(self) }
    }

    /// True if both handles point to the same underlying resource.
    pub fn ptr_eq(&self, other: &Subscription) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Cancel for Subscription {
    fn cancel(&self) {
        self.inner.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl From<CancellationToken> for Subscription {
    /// Cancelling the subscription cancels the token.
    fn from(token: CancellationToken) -> Self {
        Subscription::create(move || token.cancel())
    }
}

/// RAII guard: cancels the wrapped subscription on drop.
pub struct SubscriptionGuard {
    sub: Option<Subscription>,
}

impl SubscriptionGuard {
    /// Cancels the wrapped subscription now; dropping the guard is then a no-op.
    pub fn cancel(&self) {
        if let Some(sub) = &self.sub {
            sub.cancel();
        }
    }

    /// Detaches the subscription without cancelling it.
    pub fn release(mut self) -> Subscription {
        self.sub.take().unwrap_or_else(Subscription::cancelled)
    }
}

impl fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionGuard")
            .field("sub", &self.sub)
            .finish()
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(sub) = self.sub.take() {
            sub.cancel();
        }
    }
}
