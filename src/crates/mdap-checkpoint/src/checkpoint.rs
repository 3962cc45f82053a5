//! The [`Checkpoint`] record and the [`CheckpointSaver`] trait.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A snapshot of execution state taken at a particular step.
///
/// `S` is the host executor's state type (`mdap_core::value::Value` for the
/// MDAP executor itself); this crate has no dependency on that type so it
/// can be reused by any state-stepping caller, the same way the lineage's
/// checkpoint crate was kept independent of any one graph shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint<S> {
    /// Index of the step this checkpoint was taken after.
    pub step_index: i64,
    /// The state captured at `step_index`.
    pub state: S,
    /// Wall-clock time the checkpoint was recorded.
    pub timestamp: DateTime<Utc>,
}

impl<S> Checkpoint<S> {
    pub fn new(step_index: i64, state: S) -> Self {
        Self {
            step_index,
            state,
            timestamp: Utc::now(),
        }
    }
}

/// Persists and retrieves [`Checkpoint`] records.
///
/// The default, in-process shape is "in-memory by default, pluggable
/// backend": [`crate::InMemoryCheckpointSaver`] ships as the always-available
/// implementation, and a host application wires its own durable saver (a
/// database, object storage, a file) behind this trait exactly as it would
/// wire its own provider behind `mdap_llm::Provider`.
#[async_trait]
pub trait CheckpointSaver<S>: Send + Sync
where
    S: Clone + Send + Sync,
{
    /// Append a checkpoint. Callers append in strictly increasing
    /// `step_index` order; a saver is not required to accept out-of-order
    /// writes.
    async fn put(&self, checkpoint: Checkpoint<S>) -> Result<()>;

    /// Return every checkpoint recorded so far, ordered by `step_index`.
    async fn list(&self) -> Result<Vec<Checkpoint<S>>>;

    /// Return the most recently appended checkpoint, if any.
    async fn latest(&self) -> Result<Option<Checkpoint<S>>>;
}
