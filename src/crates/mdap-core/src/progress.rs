//! The Progress Emitter (§4.9): best-effort, non-blocking lifecycle events.

use std::collections::HashMap;
use tokio::sync::mpsc;

/// Default capacity for the progress channel. Generous enough that a
/// reasonably prompt observer never drops an event, small enough that a
/// stalled observer can't let the channel grow unbounded.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// A lifecycle event emitted by the Step Loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Start,
    Step {
        name: String,
        index: u64,
        percentage: u8,
    },
    Error {
        message: String,
    },
    Complete {
        metadata: HashMap<String, String>,
    },
}

/// The sending half the Step Loop holds. Delivery is best-effort: a full
/// channel (a slow or absent observer) drops the event rather than
/// stalling execution.
#[derive(Clone)]
pub struct ProgressEmitter {
    sender: mpsc::Sender<ProgressEvent>,
}

impl ProgressEmitter {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Emit an event, dropping it silently if the channel is full or the
    /// receiver has gone away.
    pub fn emit(&self, event: ProgressEvent) {
        if let Err(e) = self.sender.try_send(event) {
            tracing::debug!(error = %e, "progress event dropped");
        }
    }
}

/// Whether a step at `step_index` of `total_steps` should emit a progress
/// event, per the Step Loop's throttling rule (§4.2): the first ten steps,
/// every hundredth step thereafter, and the terminal step.
pub fn should_emit(step_index: u64, total_steps: u64) -> bool {
    step_index < 10 || step_index % 100 == 0 || step_index + 1 == total_steps
}

/// `floor(step_index * 100 / total_steps)`, saturating at 100 when
/// `total_steps` is zero.
pub fn percentage(step_index: u64, total_steps: u64) -> u8 {
    if total_steps == 0 {
        return 100;
    }
    ((step_index * 100) / total_steps).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emitted_events_are_received_in_order() {
        let (emitter, mut rx) = ProgressEmitter::new(4);
        emitter.emit(ProgressEvent::Start);
        emitter.emit(ProgressEvent::Step {
            name: "step-0".to_string(),
            index: 0,
            percentage: 0,
        });

        assert_eq!(rx.recv().await, Some(ProgressEvent::Start));
        assert!(matches!(rx.recv().await, Some(ProgressEvent::Step { .. })));
    }

    #[test]
    fn full_channel_drops_rather_than_blocks() {
        let (emitter, _rx) = ProgressEmitter::new(1);
        emitter.emit(ProgressEvent::Start);
        // Second emit would block a bounded send; try_send must drop it
        // instead of panicking or deadlocking.
        emitter.emit(ProgressEvent::Start);
    }

    #[test]
    fn throttling_covers_early_steps_multiples_of_100_and_the_terminal_step() {
        assert!(should_emit(0, 500));
        assert!(should_emit(9, 500));
        assert!(!should_emit(10, 500));
        assert!(should_emit(100, 500));
        assert!(should_emit(499, 500));
    }

    #[test]
    fn percentage_is_floor_division() {
        assert_eq!(percentage(3, 7), 42);
        assert_eq!(percentage(0, 0), 100);
    }
}
