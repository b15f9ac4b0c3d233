//! Error types used by eventual values, streams and worker adapters.
//!
//! The library itself is permissive: protocol violations (completing twice,
//! emitting after completion, cancelling twice) are silent no-ops and never
//! surface here. [`Error`] only covers the recoverable failures a consumer can
//! observe:
//!
//! - [`Error::NoSuchElement`]: `first_or_error()` on a stream that completed empty.
//! - [`Error::Disconnected`]: a blocking or async waiter lost its producer.
//! - [`Error::Timeout`]: a bounded wait elapsed.
//! - [`Error::NoRuntime`] / [`Error::WorkerStart`]: worker plumbing failures.
//!
//! Like the rest of the crate, every variant provides `as_label` / `as_message`
//! helpers for logs.

use std::time::Duration;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// # Errors observable by consumers of eventual values and streams.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The stream completed without emitting a single event.
    #[error("stream completed without emitting an element")]
    NoSuchElement,

    /// The producer was cancelled or released before it completed.
    #[error("producer released before completion")]
    Disconnected,

    /// A bounded wait elapsed before completion.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The wait that was exceeded.
        timeout: Duration,
    },

    /// No tokio runtime was available on the calling thread.
    #[error("no runtime available: {error}")]
    NoRuntime {
        /// The underlying error message.
        error: String,
    },

    /// A dedicated worker runtime could not be built.
    #[error("worker failed to start: {error}")]
    WorkerStart {
        /// The underlying error message.
        error: String,
    },
}

impl Error {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use eventual::Error;
    ///
    /// assert_eq!(Error::NoSuchElement.as_label(), "no_such_element");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::NoSuchElement => "no_such_element",
            Error::Disconnected => "disconnected",
            Error::Timeout { .. } => "timeout",
            Error::NoRuntime { .. } => "no_runtime",
            Error::WorkerStart { .. } => "worker_start",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            Error::NoSuchElement => "no element".to_string(),
            Error::Disconnected => "disconnected".to_string(),
            Error::Timeout { timeout } => format!("timeout: {timeout:?}"),
            Error::NoRuntime { error } => format!("no runtime: {error}"),
            Error::WorkerStart { error } => format!("worker start: {error}"),
        }
    }

    /// Indicates whether waiting again may succeed.
    ///
    /// Only [`Error::Timeout`] is retryable; the others describe a final state.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use eventual::Error;
    ///
    /// assert!(Error::Timeout { timeout: Duration::from_millis(5) }.is_retryable());
    /// assert!(!Error::Disconnected.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}
