//! # Example: pipeline
//!
//! Synchronous pipeline over hot sources, without any runtime.
//!
//! Demonstrates how to:
//! - Feed a [`CachingEventSource`] imperatively and replay its latest value.
//! - Compose `changes`, `with_latest_from`, `switch_map` and `scan`.
//! - Convert a stream into an [`Eventual`] with `first` / `collect`.
//! - Release everything with one `cancel()`.
//!
//! ## Flow
//! ```text
//! query (Caching) ──changes──► switch_map(search) ─┐
//!                                                  ├─ with_latest_from(limit) ──► print
//! limit (Broadcasting) ────────────────────────────┘
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example pipeline
//! ```

use eventual::{BroadcastingEventSource, CachingEventSource, EventStream, Eventual, events_of};

fn search(query: String) -> EventStream<String> {
    let hits: Vec<String> = ["alpha", "beta", "gamma", "alphabet"]
        .iter()
        .filter(|word| word.starts_with(query.as_str()))
        .map(|word| word.to_string())
        .collect();
    events_of(hits)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Hot inputs: the query replays its latest value, the limit does not.
    let query = CachingEventSource::new(String::new());
    let limit = BroadcastingEventSource::new();

    // 2. Derived pipeline: restart the search on every distinct query.
    let results = query
        .events()
        .changes()
        .switch_map(search)
        .with_latest_from(&limit.events(), |hit, max: &usize| (hit, *max));

    let sub = results.for_each(|(hit, max)| println!("[results] {hit} (limit {max})"));

    // 3. Drive it.
    limit.emit_event(10);
    query.emit_event("al".to_string());
    query.emit_event("al".to_string()); // suppressed by changes()
    query.emit_event("g".to_string());

    // 4. A single cancel releases both sources.
    sub.cancel();
    println!(
        "[sources] query subscribers={}, limit subscribers={}",
        query.subscriber_count(),
        limit.subscriber_count()
    );

    // 5. Streams to eventual values.
    let running: Eventual<Vec<i32>> = events_of(1..=5).scan(0, |acc, v| acc + v).collect();
    println!("[scan] {:?}", running.get_blocking()?);

    let first_word = query.events().first().get_blocking()?;
    println!("[first] latest query = {first_word:?}");

    Ok(())
}
