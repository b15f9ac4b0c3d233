//! # Worker pool configuration.
//!
//! [`WorkerConfig`] centralizes the settings of a dedicated
//! [`WorkerPool`](super::WorkerPool).
//!
//! ## Sentinel values
//! - `worker_threads = 0` → runtime default (one per core)
//! - `max_blocking_threads = 0` → runtime default
//! - `grace = 0s` → shutdown does not wait for running jobs

use std::time::Duration;

/// Settings for a dedicated multi-threaded worker pool.
///
/// ## Field semantics
/// - `worker_threads`: async worker threads (`0` = runtime default)
/// - `thread_name`: name given to every pool thread
/// - `max_blocking_threads`: cap for blocking jobs (`0` = runtime default)
/// - `grace`: maximum wait for running jobs on shutdown
///
/// Prefer the helper accessors over checking the sentinels directly.
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Number of async worker threads.
    pub worker_threads: usize,

    /// Thread name used for every thread of the pool.
    pub thread_name: String,

    /// Upper bound on threads running blocking jobs.
    pub max_blocking_threads: usize,

    /// Maximum time [`WorkerPool::shutdown`](super::WorkerPool::shutdown)
    /// waits for running jobs before abandoning them.
    pub grace: Duration,
}

impl WorkerConfig {
    /// Returns the async worker thread count as an `Option`.
    ///
    /// - `None` → runtime default
    /// - `Some(n)` → exactly `n` threads
    #[inline]
    pub fn worker_threads_limit(&self) -> Option<usize> {
        if self.worker_threads == 0 {
            None
        } else {
            Some(self.worker_threads)
        }
    }

    /// Returns the blocking thread cap as an `Option`.
    #[inline]
    pub fn blocking_threads_limit(&self) -> Option<usize> {
        if self.max_blocking_threads == 0 {
            None
        } else {
            Some(self.max_blocking_threads)
        }
    }
}

impl Default for WorkerConfig {
    /// Default configuration:
    ///
    /// - `worker_threads = 0` (one per core)
    /// - `thread_name = "eventual-worker"`
    /// - `max_blocking_threads = 0` (runtime default)
    /// - `grace = 5s`
    fn default() -> Self {
        Self {
            worker_threads: 0,
            thread_name: "eventual-worker".to_string(),
            max_blocking_threads: 0,
            grace: Duration::from_secs(5),
        }
    }
}
