//! Error types for MDAP execution.
//!
//! This module defines the error taxonomy from the executor's error-handling
//! design: configuration errors and resolution errors fail before any
//! sampling occurs, provider errors are always recovered locally (a sample is
//! red-flagged, never an escalation), consensus errors fail a single step
//! (and with it the pipeline), and cancellation surfaces unchanged.
//!
//! # Propagation Policy
//!
//! ```text
//! ConfigError / ResolveError  -> fail before sampling, pipeline never starts
//! ProviderError               -> recovered locally, sample red-flagged, never escalates
//! ConsensusError              -> fails the step, which fails the pipeline
//! Cancelled                   -> surfaced unchanged, partial result returned
//! FatalError                  -> aborts execution immediately
//! ```

use thiserror::Error;

/// Result type for MDAP executor operations.
pub type Result<T> = std::result::Result<T, MdapError>;

/// Errors produced by the MDAP executor.
#[derive(Error, Debug)]
pub enum MdapError {
    /// The effective configuration could not be resolved: an out-of-range
    /// field (`k < 1`, a negative temperature or interval) or an unknown
    /// voting strategy.
    ///
    /// Detected once, before any sample is issued.
    #[error("configuration error: {0}")]
    Config(String),

    /// A microstep referenced an agent, file, or other entity the
    /// workspace/registry could not resolve.
    #[error("failed to resolve '{reference}': {reason}")]
    Resolve { reference: String, reason: String },

    /// `max_retries` voting rounds completed for a step without a winner
    /// reaching the configured margin.
    #[error("no consensus after {rounds} rounds ({total_samples} samples, {rejected_samples} rejected)")]
    Consensus {
        rounds: u32,
        total_samples: u64,
        rejected_samples: u64,
    },

    /// Ambient cancellation was observed mid-step.
    #[error("execution cancelled")]
    Cancelled,

    /// A provider call failed. Surfaced only when a caller bypasses the
    /// red-flag recovery path (e.g. constructing a sample directly); within
    /// the executor itself, provider errors are converted into red-flagged
    /// samples and never reach this variant.
    #[error("provider error: {0}")]
    Provider(#[from] mdap_llm::ProviderError),

    /// A checkpoint backend failed to persist or load a checkpoint.
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] mdap_checkpoint::CheckpointError),

    /// A non-provider runtime failure unrelated to consensus or
    /// configuration (e.g. a malformed pipeline description reaching
    /// execution despite passing earlier validation).
    #[error("fatal error: {0}")]
    Fatal(String),
}

impl MdapError {
    pub fn config(msg: impl Into<String>) -> Self {
        MdapError::Config(msg.into())
    }

    pub fn resolve(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        MdapError::Resolve {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error represents a pre-execution failure (no sampling
    /// ever occurred), as opposed to a failure mid-run.
    pub fn is_pre_execution(&self) -> bool {
        matches!(self, MdapError::Config(_) | MdapError::Resolve { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consensus_error_message_includes_counters() {
        let err = MdapError::Consensus {
            rounds: 100,
            total_samples: 300,
            rejected_samples: 300,
        };
        let msg = err.to_string();
        assert!(msg.contains("100 rounds"));
        assert!(msg.contains("300 samples"));
    }

    #[test]
    fn config_errors_are_pre_execution() {
        assert!(MdapError::config("k must be >= 1").is_pre_execution());
        assert!(!MdapError::Cancelled.is_pre_execution());
    }
}
