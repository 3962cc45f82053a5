//! The [`Provider`] trait: the executor's only LLM-facing dependency.
//!
//! # Architecture Philosophy
//!
//! `mdap-llm` is not an LLM client library. It defines the trait the
//! Parallel Sampler calls, and users implement it for whichever provider
//! (OpenAI, Anthropic, a local model server) they deploy against. Concrete
//! wire-protocol implementations are out of scope for this core — see the
//! spec's out-of-scope list — so this crate ships only the trait plus a
//! [`ScriptedProvider`] test double used by the executor's own test suite.
//!
//! # Example Implementation
//!
//! ```rust,ignore
//! use mdap_llm::{Provider, CompletionRequest, CompletionResponse, ProviderError, RunContext};
//! use async_trait::async_trait;
//!
//! struct MyProvider { api_key: String }
//!
//! #[async_trait]
//! impl Provider for MyProvider {
//!     async fn complete(&self, ctx: &RunContext, req: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
//!         if ctx.is_cancelled() {
//!             return Err(ProviderError::Other("cancelled".into()));
//!         }
//!         // call out to the real API, convert the response
//!         todo!()
//!     }
//! }
//! ```

use crate::config::{CompletionRequest, CompletionResponse};
use crate::context::RunContext;
use crate::error::ProviderError;
use async_trait::async_trait;

/// A source of LLM completions.
///
/// Implementations must be `Send + Sync`: the Parallel Sampler shares one
/// `Arc<dyn Provider>` across `parallel_samples` concurrent calls per round.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Produce a single completion for `req`.
    ///
    /// Implementations should return `Err` for network failures,
    /// authentication failures, rate limiting, or malformed requests — the
    /// caller (the Parallel Sampler) converts any `Err` into a red-flagged
    /// sample rather than aborting the round, so there is no need to retry
    /// internally unless the implementation wants a tighter retry loop of
    /// its own beneath this trait.
    async fn complete(
        &self,
        ctx: &RunContext,
        req: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError>;
}

/// A test double that returns a pre-programmed sequence of raw completion
/// contents, one per call, cycling or exhausting per configuration.
///
/// Modeled on the lineage's `MockModel` (`langgraph-core::llm::traits`
/// tests): enough to drive the end-to-end scenarios in §8 without a real
/// network dependency. Each call consumes the next scripted content in
/// order; token count is derived as the whitespace-split word count unless
/// an explicit override was scripted.
pub struct ScriptedProvider {
    responses: std::sync::Mutex<std::collections::VecDeque<ScriptedResponse>>,
}

/// One scripted response: its raw content, and an optional explicit token
/// count (otherwise derived from word count, which is enough to exercise
/// the length red-flag in tests without needing a real tokenizer).
#[derive(Clone)]
pub struct ScriptedResponse {
    pub content: String,
    pub token_count: Option<u32>,
}

impl ScriptedResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            token_count: None,
        }
    }

    pub fn with_token_count(mut self, token_count: u32) -> Self {
        self.token_count = Some(token_count);
        self
    }
}

impl From<&str> for ScriptedResponse {
    fn from(s: &str) -> Self {
        ScriptedResponse::new(s)
    }
}

impl ScriptedProvider {
    pub fn new(responses: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.into_iter().collect()),
        }
    }

    /// Remaining scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn complete(
        &self,
        _ctx: &RunContext,
        _req: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(resp) => {
                let token_count = resp
                    .token_count
                    .unwrap_or_else(|| resp.content.split_whitespace().count() as u32);
                Ok(CompletionResponse::new(resp.content, token_count))
            }
            None => Err(ProviderError::Other("ScriptedProvider exhausted".to_string())),
        }
    }
}
