//! Error types for admission operations.

use thiserror::Error;

/// Errors produced by the admission queue and its builders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// Every admission slot (running plus waiting) is taken.
    #[error("queue full: all {max_total} admission slots are taken")]
    QueueFull {
        /// Total admission capacity of the queue.
        max_total: usize,
    },
    /// A release was requested with nothing held (missing `add` or `start`).
    #[error("queue empty: nothing to release")]
    QueueEmpty,
    /// Configuration cannot produce a working queue.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AdmissionError {
    /// True for the backpressure case, as opposed to a protocol violation.
    #[must_use]
    pub const fn is_backpressure(&self) -> bool {
        matches!(self, Self::QueueFull { .. })
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
