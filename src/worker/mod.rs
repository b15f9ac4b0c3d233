//! # Workers, thread-hopping adapters, async bridges and timers.
//!
//! The reactive core is scheduler-agnostic: callbacks run on whichever
//! thread the producer uses. This module layers scheduling on top:
//!
//! ```text
//! Worker ─┬─ InlineWorker                 caller's thread
//!         └─ RuntimeWorker ◄── WorkerPool  tokio runtime (WorkerConfig)
//!
//! adapters  from_worker / subscribe_on / deliver_on
//! bridges   Eventual: IntoFuture, EventStream::into_stream, Eventual::from_future
//! timers    timer(handle, d), Eventual::timeout(handle, d)
//! ```

mod adapters;
mod bridge;
mod config;
mod serial;
mod timer;
#[allow(clippy::module_inception)]
mod worker;

pub use bridge::{EventReceiver, EventualFuture};
pub use config::WorkerConfig;
pub use timer::timer;
pub use worker::{InlineWorker, Job, RuntimeWorker, Worker, WorkerPool};
