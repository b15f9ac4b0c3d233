//! # Workers: where adapter jobs run.
//!
//! The core never spawns threads. Adapters that hop threads take a
//! [`Worker`] and hand it [`Job`]s:
//!
//! ```text
//! InlineWorker    runs the job on the calling thread
//! RuntimeWorker   spawns the job on a tokio runtime (async task or blocking pool)
//! WorkerPool      owns a dedicated multi-threaded runtime built from WorkerConfig
//! ```

use std::fmt;
use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};
use tracing::debug;

use crate::error::{Error, Result};

use super::config::WorkerConfig;

/// Unit of work handed to a [`Worker`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Executes jobs, possibly on another thread.
pub trait Worker: Send + Sync + 'static {
    /// Runs `job` now or later. Every job must eventually run or be dropped.
    fn execute(&self, job: Job);

    /// Name used in logs.
    fn name(&self) -> &str {
        "worker"
    }
}

impl<W: Worker + ?Sized> Worker for Arc<W> {
    fn execute(&self, job: Job) {
        (**self).execute(job);
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Runs every job immediately on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineWorker;

impl Worker for InlineWorker {
    fn execute(&self, job: Job) {
        job();
    }

    fn name(&self) -> &str {
        "inline"
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SpawnMode {
    Async,
    Blocking,
}

/// Spawns jobs on a tokio runtime.
#[derive(Clone)]
pub struct RuntimeWorker {
    handle: Handle,
    mode: SpawnMode,
}

impl fmt::Debug for RuntimeWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeWorker")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl RuntimeWorker {
    /// Runs jobs as async tasks. Jobs should not block.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            mode: SpawnMode::Async,
        }
    }

    /// Runs jobs on the runtime's blocking pool.
    pub fn blocking(handle: Handle) -> Self {
        Self {
            handle,
            mode: SpawnMode::Blocking,
        }
    }

    /// Async worker on the runtime the caller is running in.
    ///
    /// Fails with [`Error::NoRuntime`] outside a tokio runtime.
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|err| Error::NoRuntime {
                error: err.to_string(),
            })
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Worker for RuntimeWorker {
    fn execute(&self, job: Job) {
        match self.mode {
            SpawnMode::Async => {
                self.handle.spawn(async move { job() });
            }
            SpawnMode::Blocking => {
                self.handle.spawn_blocking(job);
            }
        }
    }

    fn name(&self) -> &str {
        match self.mode {
            SpawnMode::Async => "runtime",
            SpawnMode::Blocking => "runtime-blocking",
        }
    }
}

/// Dedicated multi-threaded runtime backing [`RuntimeWorker`]s.
///
/// Must be created and dropped outside of async contexts.
pub struct WorkerPool {
    runtime: Runtime,
    config: WorkerConfig,
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WorkerPool {
    /// Builds the runtime described by `config`.
    pub fn new(config: WorkerConfig) -> Result<Self> {
        let mut builder = Builder::new_multi_thread();
        builder.thread_name(config.thread_name.clone()).enable_time();
        if let Some(threads) = config.worker_threads_limit() {
            builder.worker_threads(threads);
        }
        if let Some(threads) = config.blocking_threads_limit() {
            builder.max_blocking_threads(threads);
        }
        let runtime = builder.build().map_err(|err| Error::WorkerStart {
            error: err.to_string(),
        })?;
        debug!(
            thread_name = %config.thread_name,
            worker_threads = ?config.worker_threads_limit(),
            "worker pool started"
        );
        Ok(Self { runtime, config })
    }

    /// Worker spawning async tasks on this pool.
    pub fn worker(&self) -> RuntimeWorker {
        RuntimeWorker::new(self.runtime.handle().clone())
    }

    /// Worker running jobs on this pool's blocking threads.
    pub fn blocking_worker(&self) -> RuntimeWorker {
        RuntimeWorker::blocking(self.runtime.handle().clone())
    }

    pub fn handle(&self) -> &Handle {
        self.runtime.handle()
    }

    /// Stops the pool, waiting up to `grace` for running jobs.
    pub fn shutdown(self) {
        debug!(grace = ?self.config.grace, "worker pool shutting down");
        self.runtime.shutdown_timeout(self.config.grace);
    }
}
