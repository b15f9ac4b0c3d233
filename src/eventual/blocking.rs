//! # Synchronous access to eventual values.
//!
//! The value may be delivered on any thread, so the hand-off goes through a
//! one-slot channel. The internal subscription is held by a
//! [`SubscriptionGuard`](crate::SubscriptionGuard) and released on every exit
//! path: value received, timeout, or disconnection.
//!
//! Do not call these from inside an async task: they park the thread.

use std::sync::mpsc;
use std::time::Duration;

use crate::error::{Error, Result};

use super::eventual::Eventual;

impl<T: Send + 'static> Eventual<T> {
    /// Blocks the calling thread until the value arrives.
    ///
    /// Returns [`Error::Disconnected`] once every producer handle of the
    /// subscription was dropped without a value.
    pub fn get_blocking(&self) -> Result<T> {
        let (tx, rx) = mpsc::sync_channel(1);
        let _guard = self
            .subscribe(move |value| {
                let _ = tx.send(value);
            })
            .guard();
        rx.recv().map_err(|_| Error::Disconnected)
    }

    /// Like [`get_blocking`](Self::get_blocking), giving up after `timeout`.
    pub fn get_blocking_timeout(&self, timeout: Duration) -> Result<T> {
        let (tx, rx) = mpsc::sync_channel(1);
        let _guard = self
            .subscribe(move |value| {
                let _ = tx.send(value);
            })
            .guard();
        rx.recv_timeout(timeout).map_err(|err| match err {
            mpsc::RecvTimeoutError::Timeout => Error::Timeout { timeout },
            mpsc::RecvTimeoutError::Disconnected => Error::Disconnected,
        })
    }
}
