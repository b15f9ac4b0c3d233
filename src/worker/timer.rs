//! # Timer-backed eventuals.
//!
//! The core has no timeout primitive; timeouts are composed by racing the
//! work against a [`timer`]:
//!
//! ```text
//! timeout(d) = race([ self.map(Some), timer(d).map(|_| None) ])
//! ```

use std::time::Duration;

use tokio::runtime::Handle;

use crate::eventual::{Completable, Eventual, Potential, race};

/// Fires once `duration` elapsed on `handle`'s timer.
///
/// Cancelling the subscription drops the pending sleep.
pub fn timer(handle: &Handle, duration: Duration) -> Completable {
    Eventual::from_future(handle.clone(), move || tokio::time::sleep(duration))
}

impl<T: Send + 'static> Eventual<T> {
    /// Resolves to `Some(value)`, or `None` if `duration` elapses first.
    ///
    /// Whichever side loses is cancelled.
    pub fn timeout(&self, handle: &Handle, duration: Duration) -> Potential<T> {
        race(vec![
            self.into_potential(),
            timer(handle, duration).map(|()| None),
        ])
    }
}
