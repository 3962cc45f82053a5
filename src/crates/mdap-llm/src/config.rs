//! Request and response types exchanged with a [`Provider`](crate::Provider).

use serde::{Deserialize, Serialize};

/// A single completion request issued by the Parallel Sampler (§4.4).
///
/// Carries exactly what the executor needs to obtain one sample: the model
/// to call, the agent's system prompt, the single user prompt built by the
/// Microstep Builder, and the per-sample temperature/token-budget the
/// sampler computed for this index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    /// Identifier of the model to invoke (provider-defined format).
    pub model: String,

    /// The agent's configured system prompt, with the reliability preamble
    /// appended by the Microstep Builder.
    pub system_prompt: String,

    /// The single user message: the assembled microstep prompt.
    pub user_prompt: String,

    /// Sampling temperature for this request.
    pub temperature: f32,

    /// Maximum tokens the provider should generate.
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            temperature: 0.0,
            max_tokens: 750,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Token accounting returned alongside a completion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A provider's response to a [`CompletionRequest`].
///
/// `content` is the raw text the Response Parser (§4.7) and Red-Flag Filter
/// (§4.5) operate on; the executor never inspects provider-specific
/// metadata beyond `content` and `usage.output_tokens`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub usage: Usage,
}

impl CompletionResponse {
    pub fn new(content: impl Into<String>, output_tokens: u32) -> Self {
        let content = content.into();
        Self {
            content,
            usage: Usage {
                input_tokens: 0,
                output_tokens,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_sets_sampling_parameters() {
        let req = CompletionRequest::new("gpt-x", "be terse", "## Task\ndo it")
            .with_temperature(0.1)
            .with_max_tokens(512);

        assert_eq!(req.temperature, 0.1);
        assert_eq!(req.max_tokens, 512);
    }
}
