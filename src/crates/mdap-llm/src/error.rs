//! Error types for LLM provider implementations.

use thiserror::Error;

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors a [`Provider`](crate::Provider) implementation may return.
///
/// The executor never propagates these directly: every [`ProviderError`]
/// returned from a sample request is converted into a red-flagged sample
/// with reason `"LLM error: <msg>"` (§4.4), so a transient outage degrades
/// one sample's vote rather than aborting the step.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The underlying transport (HTTP, local socket, subprocess) failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider rejected the request (bad model id, malformed prompt).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The provider is rate-limiting this caller.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The provider returned a response this client could not parse.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The requested model id is unknown to the provider.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// A general provider-side failure not covered above.
    #[error("provider error: {0}")]
    Other(String),
}

impl ProviderError {
    /// Whether a caller retrying the same request might reasonably expect a
    /// different outcome. The executor itself does not retry at this layer
    /// (a failed sample is red-flagged and counted, not retried in place);
    /// this classification exists for host applications layering their own
    /// provider-level retry policy in front of a [`Provider`](crate::Provider)
    /// implementation.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::Transport(_) | ProviderError::RateLimited(_)
        )
    }
}
