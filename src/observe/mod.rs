//! # Observational decorators.
//!
//! Methods added to [`EventStream`](crate::EventStream) and
//! [`Eventual`](crate::Eventual) that observe a pipeline without altering
//! emission order, timing, or cancellation:
//!
//! - `on_each`, `do_on_cancel`: always available.
//! - `log_each`, `log_result`, `log_subscription`: feature `logging`
//!   (enabled by default), emitted through `tracing`.

#[cfg(feature = "logging")]
mod log;
mod tap;
