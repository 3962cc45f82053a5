//! # mdap-llm — the MDAP executor's provider contract
//!
//! This crate defines the trait boundary between the MDAP executor
//! ([`mdap-core`](../mdap_core/index.html)) and whatever LLM backend a host
//! application deploys against. It is deliberately thin:
//!
//! - [`Provider`] — the async trait the Parallel Sampler calls once per
//!   sample.
//! - [`CompletionRequest`] / [`CompletionResponse`] — the wire-agnostic
//!   request/response shape (model id, prompts, temperature, token budget;
//!   content and output-token usage).
//! - [`RunContext`] / [`CancellationHandle`] — the ambient cancellation
//!   signal threaded through every provider call.
//! - [`ScriptedProvider`] — a deterministic test double, not a real
//!   provider, used to drive the executor's own test suite without a
//!   network dependency.
//!
//! Concrete provider implementations (an OpenAI client, an Anthropic
//! client, a local Ollama client) are out of scope for this core — a host
//! application implements [`Provider`] itself, the same way the lineage
//! framework this crate descends from left `ChatModel` implementations to
//! downstream crates.

pub mod config;
pub mod context;
pub mod error;
pub mod provider;

pub use config::{CompletionRequest, CompletionResponse, Usage};
pub use context::{CancellationHandle, RunContext};
pub use error::{ProviderError, Result};
pub use provider::{Provider, ScriptedProvider, ScriptedResponse};
