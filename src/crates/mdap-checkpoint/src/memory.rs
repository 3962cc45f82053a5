//! [`InMemoryCheckpointSaver`]: the shipped, always-available [`CheckpointSaver`].

use crate::checkpoint::{Checkpoint, CheckpointSaver};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Mutex;

/// Holds checkpoints in a plain `Vec` behind a mutex.
///
/// This is what the Step Loop uses unless a host application supplies its
/// own saver: checkpoints are appended during a run and read back (for
/// inspection, or to seed `ExecutionResult::checkpoints`) at the end.
#[derive(Default)]
pub struct InMemoryCheckpointSaver<S> {
    checkpoints: Mutex<Vec<Checkpoint<S>>>,
}

impl<S> InMemoryCheckpointSaver<S> {
    pub fn new() -> Self {
        Self {
            checkpoints: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl<S> CheckpointSaver<S> for InMemoryCheckpointSaver<S>
where
    S: Clone + Send + Sync,
{
    async fn put(&self, checkpoint: Checkpoint<S>) -> Result<()> {
        self.checkpoints.lock().unwrap().push(checkpoint);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Checkpoint<S>>> {
        Ok(self.checkpoints.lock().unwrap().clone())
    }

    async fn latest(&self) -> Result<Option<Checkpoint<S>>> {
        Ok(self.checkpoints.lock().unwrap().last().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_in_order_and_reports_latest() {
        let saver: InMemoryCheckpointSaver<i32> = InMemoryCheckpointSaver::new();
        saver.put(Checkpoint::new(0, 10)).await.unwrap();
        saver.put(Checkpoint::new(1, 20)).await.unwrap();

        let all = saver.list().await.unwrap();
        assert_eq!(all.iter().map(|c| c.step_index).collect::<Vec<_>>(), vec![0, 1]);

        let latest = saver.latest().await.unwrap().unwrap();
        assert_eq!(latest.step_index, 1);
        assert_eq!(latest.state, 20);
    }

    #[tokio::test]
    async fn empty_saver_has_no_latest() {
        let saver: InMemoryCheckpointSaver<i32> = InMemoryCheckpointSaver::new();
        assert!(saver.latest().await.unwrap().is_none());
    }
}
