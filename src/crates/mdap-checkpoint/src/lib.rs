//! # mdap-checkpoint — checkpoint persistence for the MDAP executor
//!
//! A [`Checkpoint`] is a snapshot `(step_index, state, timestamp)` taken by
//! the Step Loop at a configured interval (§4.8). This crate defines the
//! record type plus the [`CheckpointSaver`] trait that persists it, generic
//! over the caller's state type so it carries no dependency on
//! `mdap-core`'s `Value` — the same separation the lineage this crate
//! descends from drew between its graph engine and its checkpoint storage.
//!
//! ## In-memory by default, pluggable backend
//!
//! [`InMemoryCheckpointSaver`] is the default and the only backend this
//! crate ships. A host application that wants durable checkpoints
//! implements [`CheckpointSaver`] itself (a database, a file, object
//! storage) and wires it into the executor the same way it wires its own
//! `mdap_llm::Provider`.
//!
//! ```rust
//! # use mdap_checkpoint::{Checkpoint, CheckpointSaver, InMemoryCheckpointSaver};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let saver: InMemoryCheckpointSaver<i64> = InMemoryCheckpointSaver::new();
//! saver.put(Checkpoint::new(0, 42)).await.unwrap();
//! assert_eq!(saver.latest().await.unwrap().unwrap().state, 42);
//! # }
//! ```

pub mod checkpoint;
pub mod error;
pub mod memory;

pub use checkpoint::{Checkpoint, CheckpointSaver};
pub use error::{CheckpointError, Result};
pub use memory::InMemoryCheckpointSaver;
