//! Error types for checkpoint operations.

use thiserror::Error;

/// Result type for checkpoint operations.
pub type Result<T> = std::result::Result<T, CheckpointError>;

/// Errors a [`CheckpointSaver`](crate::CheckpointSaver) implementation may return.
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// No checkpoint exists at the requested index.
    #[error("checkpoint not found at step {0}")]
    NotFound(i64),

    /// A backend rejected a write (full, unreachable, permission denied, ...).
    #[error("checkpoint storage error: {0}")]
    Storage(String),

    /// Serialization failure when a backend persists state out-of-process.
    #[error("checkpoint serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
