//! Error types for block generation.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context. Failures raised on the background tasks are never surfaced
//! synchronously to producers; they are reported through
//! [`BlockListener::on_error`](crate::BlockListener::on_error) instead.
//!
//! ## Helper Constructors
//!
//! Use helper methods for common error scenarios:
//!
//! ```rust
//! use blockgen::BlockError;
//!
//! let error = BlockError::queue_closed("push worker is gone");
//! if error.is_retryable() {
//!     println!("Can retry this operation");
//! }
//! ```

use crate::types::GeneratorState;
use thiserror::Error;

/// Result type alias for block generation operations.
pub type Result<T, E = BlockError> = std::result::Result<T, E>;

/// Main error type for block generation operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BlockError {
    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    #[error("invalid generator state: expected {expected}, found {found}")]
    InvalidState { expected: GeneratorState, found: GeneratorState },

    #[error("push queue closed: {context}")]
    QueueClosed { context: String },

    #[error("block push failed: {reason}")]
    Push {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{task} task failed")]
    Task {
        task: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl BlockError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            BlockError::Push { .. } => true,
            BlockError::Config { .. } => false,
            BlockError::InvalidState { .. } => false,
            BlockError::QueueClosed { .. } => false,
            BlockError::Task { .. } => false,
        }
    }

    /// Helper constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        BlockError::Config { reason: reason.into() }
    }

    /// Helper constructor for lifecycle state errors.
    pub fn invalid_state(expected: GeneratorState, found: GeneratorState) -> Self {
        BlockError::InvalidState { expected, found }
    }

    /// Helper constructor for closed-queue errors.
    pub fn queue_closed(context: impl Into<String>) -> Self {
        BlockError::QueueClosed { context: context.into() }
    }

    /// Helper constructor for push failures.
    pub fn push_failed(reason: impl Into<String>) -> Self {
        BlockError::Push { reason: reason.into(), source: None }
    }

    /// Helper constructor for push failures with an underlying cause.
    pub fn push_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        BlockError::Push { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for background task join failures.
    pub fn task_failed(task: impl Into<String>, source: tokio::task::JoinError) -> Self {
        BlockError::Task { task: task.into(), source }
    }
}
