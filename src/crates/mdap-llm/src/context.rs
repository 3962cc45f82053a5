//! Ambient cancellation signal shared by the executor and provider calls.
//!
//! A [`RunContext`] is handed to every [`Provider::complete`] call and to the
//! executor's step loop. It carries no deadline of its own (§5: "the
//! executor itself imposes no per-sample wall-clock timeout beyond what the
//! provider enforces") — it only answers "has the caller asked me to stop".

use tokio::sync::watch;

/// Read-only view of the cancellation signal, cheap to clone and share
/// across the concurrent sample requests a single round fans out.
#[derive(Clone)]
pub struct RunContext {
    cancelled: watch::Receiver<bool>,
}

impl RunContext {
    /// True if cancellation has already been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Resolves once cancellation has been requested. Intended for use in
    /// `tokio::select!` alongside a sample's provider future so an in-flight
    /// request can be abandoned promptly.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.cancelled.borrow() {
                return;
            }
            if self.cancelled.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Owning half of a [`RunContext`]; callers hold this and call
/// [`CancellationHandle::cancel`] to request that an in-progress execution
/// stop at the next safe point.
pub struct CancellationHandle {
    sender: watch::Sender<bool>,
}

impl CancellationHandle {
    /// Create a fresh, not-yet-cancelled context and its handle.
    pub fn new() -> (Self, RunContext) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, RunContext { cancelled: receiver })
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        let _ = self.sender.send(true);
    }
}

impl Default for CancellationHandle {
    fn default() -> Self {
        Self::new().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancellation_propagates_to_context() {
        let (handle, mut ctx) = CancellationHandle::new();
        assert!(!ctx.is_cancelled());
        handle.cancel();
        ctx.cancelled().await;
        assert!(ctx.is_cancelled());
    }
}
