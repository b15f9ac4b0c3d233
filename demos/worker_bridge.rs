//! # Example: worker_bridge
//!
//! Moving work between threads and bridging into async code.
//!
//! Demonstrates how to:
//! - Build a [`WorkerPool`] from a [`WorkerConfig`].
//! - Compute values on the pool with `Eventual::from_worker`.
//! - Hop delivery back with `deliver_on`, preserving event order.
//! - `.await` an [`Eventual`], consume a stream with `futures::StreamExt`.
//! - Bound a wait with `timeout`.
//!
//! ## Run
//! ```bash
//! cargo run --example worker_bridge
//! ```

use std::thread;
use std::time::Duration;

use eventual::{Eventual, RuntimeWorker, WorkerConfig, WorkerPool, events_of, zip};
use futures::StreamExt;

fn thread_name() -> String {
    thread::current().name().unwrap_or("unnamed").to_string()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Dedicated pool for CPU-bound jobs.
    let pool = WorkerPool::new(WorkerConfig {
        worker_threads: 2,
        thread_name: "crunch".into(),
        ..WorkerConfig::default()
    })?;

    // 2. Fan out three computations and join them.
    let parts: Vec<Eventual<u64>> = (1..=3u64)
        .map(|n| {
            Eventual::from_worker(pool.blocking_worker(), move || {
                println!("[job {n}] on {}", thread_name());
                (1..=n * 1_000).sum()
            })
        })
        .collect();
    let total = zip(parts, |sums| sums.into_iter().sum::<u64>()).get_blocking()?;
    println!("[zip] total = {total}");

    // 3. Async side on its own runtime.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let worker = RuntimeWorker::current()?;
        let handle = worker.handle().clone();

        let doubled = Eventual::from_future(handle.clone(), || async { 21 })
            .map(|v| v * 2)
            .await?;
        println!("[await] {doubled}");

        let ordered: Vec<_> = events_of(0..5)
            .deliver_on(worker)
            .into_stream()
            .collect()
            .await;
        println!("[stream] {ordered:?}");

        let late = Eventual::<u8>::never()
            .timeout(&handle, Duration::from_millis(50))
            .await?;
        println!("[timeout] {late:?}");
        Ok::<_, eventual::Error>(())
    })?;

    pool.shutdown();
    Ok(())
}
