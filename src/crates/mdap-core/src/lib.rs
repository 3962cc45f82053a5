//! # mdap-core — the MDAP executor
//!
//! A Massively-Decomposed Agentic Process (MDAP) breaks a task into an
//! ordered sequence of microsteps, each resolved by sampling an LLM
//! multiple times in parallel and voting on the result rather than trusting
//! a single completion. This crate is the executor: given a pipeline
//! description and a [`mdap_llm::Provider`], it runs every microstep to
//! completion (or a structured failure) and reports progress along the way.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌──────────────────────────────────────┐
//!                    │            Executor::run()            │
//!                    │              (Step Loop)               │
//!                    └──────────────────┬─────────────────────┘
//!                                       │ per step_index
//!                                       ▼
//!                    ┌──────────────────────────────────────┐
//!                    │         Microstep Builder              │
//!                    │   strategy + state + step -> prompt    │
//!                    └──────────────────┬─────────────────────┘
//!                                       ▼
//!                    ┌──────────────────────────────────────┐
//!                    │    Voting Arbiter (per-step rounds)    │
//!                    │  ┌──────────────────────────────────┐ │
//!                    │  │      Parallel Sampler              │ │
//!                    │  │  (join_all over concurrent calls)  │ │
//!                    │  └──────────────┬───────────────────┘ │
//!                    │                 ▼                      │
//!                    │  ┌──────────────────────────────────┐ │
//!                    │  │ Red-Flag Filter → Response Parser  │ │
//!                    │  └──────────────┬───────────────────┘ │
//!                    │                 ▼                      │
//!                    │          Vote Tally (first-to-ahead-by-k│
//!                    │           or majority)                 │
//!                    └──────────────────┬─────────────────────┘
//!                                       ▼ winner.next_state
//!                    ┌──────────────────────────────────────┐
//!                    │   Checkpointer (interval) + Progress   │
//!                    │   Emitter (Start/Step/Error/Complete)  │
//!                    └────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! - **State is an explicit value, never ambient.** `Value` is threaded
//!   through the loop by move/clone; there is no global execution context.
//! - **Determinism over cleverness.** Samples within a round are tallied in
//!   index order; prompt rendering sorts object keys for display so that
//!   identical state always produces byte-identical prompts.
//! - **Recover locally, fail loudly.** A bad sample is red-flagged and
//!   costs a vote; a bad step fails the whole run with every counter and
//!   checkpoint collected so far preserved on the result.
//!
//! ## Quick Start
//!
//! ```rust
//! use mdap_core::{DeclaredConfig, Executor, PipelineDescription, TotalSteps, Value};
//! use mdap_core::resolve::StaticAgentResolver;
//! use mdap_llm::{CancellationHandle, ScriptedProvider, ScriptedResponse};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let provider = Arc::new(ScriptedProvider::new(vec![
//!     ScriptedResponse::new("action = done\nnext_state = \"finished\""),
//! ]));
//! let resolver = Arc::new(StaticAgentResolver::new().with_agent("solver", "gpt-x", "solve it"));
//! let (executor, _progress) = Executor::new(provider, resolver);
//!
//! let pipeline = PipelineDescription {
//!     microsteps: Vec::new(),
//!     strategy: "".to_string(),
//!     mdap_config: DeclaredConfig { k: Some(1), parallel_samples: Some(1), ..Default::default() },
//!     total_steps: TotalSteps::Fixed(1),
//!     input: Value::object(),
//!     default_agent: Some(Value::from("solver")),
//! };
//!
//! let (_handle, ctx) = CancellationHandle::new();
//! let result = executor.run(&pipeline, ctx).await;
//! assert!(result.success);
//! # }
//! ```

pub mod arbiter;
pub mod builder;
pub mod config;
pub mod error;
pub mod executor;
pub mod parser;
pub mod pipeline;
pub mod progress;
pub mod redflag;
pub mod resolve;
pub mod sample;
pub mod sampler;
pub mod value;

pub use config::{DeclaredConfig, EffectiveConfig, VotingStrategy};
pub use error::{MdapError, Result};
pub use executor::{ExecutionResult, Executor, StepResult};
pub use pipeline::{MicrostepDefinition, PipelineDescription, RedFlagRules, TotalSteps};
pub use progress::ProgressEvent;
pub use sample::Sample;
pub use value::{Reference, Value};
