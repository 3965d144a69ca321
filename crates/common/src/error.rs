//! Error types for lookout
//!
//! Per-port failures never surface here; only request-level problems do.

use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum LookoutError {
    #[error("Target could not be resolved: {0}")]
    Unresolvable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Service table error: {0}")]
    ServiceTable(String),

    #[error("Worker failed: {0}")]
    Worker(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl LookoutError {
    /// Errors that make every remaining probe pointless.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, LookoutError::Unresolvable(_))
    }
}

/// Result type alias for lookout operations
pub type LookoutResult<T> = Result<T, LookoutError>;
