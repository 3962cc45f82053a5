//! The [`Sample`] record threaded through filtering, parsing, and voting.

use crate::value::Value;

/// One raw response from a provider for a given microstep, plus everything
/// derived from it by the Response Parser and Red-Flag Filter.
#[derive(Debug, Clone)]
pub struct Sample {
    pub content: String,
    pub token_count: u32,
    pub action: String,
    pub next_state: Value,
    pub red_flagged: bool,
    pub red_flag_reason: String,
    /// Set when the provider call was abandoned mid-flight because ambient
    /// cancellation fired (§5). Distinct from `red_flagged`: a cancelled
    /// sample must abort the whole step rather than just cost a vote.
    pub cancelled: bool,
}

impl Sample {
    /// A sample that hasn't been parsed or filtered yet.
    pub fn raw(content: impl Into<String>, token_count: u32) -> Self {
        Self {
            content: content.into(),
            token_count,
            action: String::new(),
            next_state: Value::Null,
            red_flagged: false,
            red_flag_reason: String::new(),
            cancelled: false,
        }
    }

    /// Synthesize a sample that failed at the provider boundary: red-flagged
    /// from the start, never parsed (§4.4: "the returned sample is
    /// synthesized as red-flagged").
    pub fn provider_error(message: impl std::fmt::Display) -> Self {
        Self {
            content: String::new(),
            token_count: 0,
            action: String::new(),
            next_state: Value::Null,
            red_flagged: true,
            red_flag_reason: format!("LLM error: {message}"),
            cancelled: false,
        }
    }

    /// Synthesize a sample for a provider call abandoned because ambient
    /// cancellation fired while it was in flight (§5, S5).
    pub fn cancelled() -> Self {
        Self {
            content: String::new(),
            token_count: 0,
            action: String::new(),
            next_state: Value::Null,
            red_flagged: true,
            red_flag_reason: "execution cancelled".to_string(),
            cancelled: true,
        }
    }

    pub fn flag(&mut self, reason: impl Into<String>) {
        self.red_flagged = true;
        self.red_flag_reason = reason.into();
    }
}
