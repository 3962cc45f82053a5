//! The Red-Flag Filter (§4.5): the ordered rule set that disqualifies a
//! sample from voting without rejecting the whole round.

use crate::config::EffectiveConfig;
use crate::pipeline::MicrostepDefinition;
use crate::sample::Sample;

/// Apply the red-flag rules to `sample` in declaration order, mutating it
/// in place. The first matching rule sets `red_flagged` and
/// `red_flag_reason`; later rules are skipped once one has fired.
///
/// Assumes `sample.action`/`sample.next_state` were already populated by
/// [`crate::parser::parse`] — rule 4 (empty action) inspects the parse
/// result rather than reparsing.
pub fn apply(sample: &mut Sample, config: &EffectiveConfig, step: &MicrostepDefinition) {
    if sample.red_flagged {
        return; // rule 1: already flagged (provider error)
    }

    if sample.token_count > config.max_output_tokens {
        sample.flag(format!(
            "token_count {} exceeds max_output_tokens {}",
            sample.token_count, config.max_output_tokens
        ));
        return;
    }

    if config.require_format {
        if let Some(pattern) = &config.output_pattern {
            if !pattern.is_match(&sample.content) {
                sample.flag(format!("content does not match output_pattern {}", pattern.as_str()));
                return;
            }
        }
    }

    if sample.action.is_empty() {
        sample.flag("empty action (parse failure)");
        return;
    }

    if let Some(rules) = &step.red_flags {
        if let Some(pattern) = &rules.regex {
            if let Ok(re) = regex::Regex::new(pattern) {
                if re.is_match(&sample.content) {
                    sample.flag(format!("content matches forbidden pattern {pattern}"));
                    return;
                }
            }
        }
        if let Some(needle) = &rules.contains {
            if sample.content.contains(needle.as_str()) {
                sample.flag(format!("content contains forbidden substring '{needle}'"));
                return;
            }
        }
        if let Some((_field, allowed)) = &rules.not_in {
            if !allowed.iter().any(|v| v == &sample.action) {
                sample.flag(format!("action '{}' is not an allowed value", sample.action));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeclaredConfig;
    use crate::pipeline::RedFlagRules;
    use crate::value::Value;

    fn config() -> EffectiveConfig {
        DeclaredConfig::default().resolve().unwrap()
    }

    fn step() -> MicrostepDefinition {
        MicrostepDefinition::synthesize(0, Value::from("agent"))
    }

    #[test]
    fn provider_error_is_never_reevaluated() {
        let mut sample = Sample::provider_error("timeout");
        apply(&mut sample, &config(), &step());
        assert_eq!(sample.red_flag_reason, "LLM error: timeout");
    }

    #[test]
    fn flags_oversized_samples() {
        let mut sample = Sample::raw("action = x", 10_000);
        sample.action = "x".to_string();
        apply(&mut sample, &config(), &step());
        assert!(sample.red_flagged);
        assert!(sample.red_flag_reason.contains("token_count"));
    }

    #[test]
    fn flags_empty_action() {
        let mut sample = Sample::raw("no action here", 5);
        apply(&mut sample, &config(), &step());
        assert!(sample.red_flagged);
        assert!(sample.red_flag_reason.contains("empty action"));
    }

    #[test]
    fn step_declared_contains_rule_rejects_matching_content() {
        let mut step = step();
        step.red_flags = Some(RedFlagRules {
            regex: None,
            contains: Some("forbidden".to_string()),
            not_in: None,
        });
        let mut sample = Sample::raw("action = forbidden move", 5);
        sample.action = "forbidden move".to_string();
        apply(&mut sample, &config(), &step);
        assert!(sample.red_flagged);
        assert!(sample.red_flag_reason.contains("forbidden substring"));
    }

    #[test]
    fn step_declared_not_in_rejects_disallowed_action() {
        let mut step = step();
        step.red_flags = Some(RedFlagRules {
            regex: None,
            contains: None,
            not_in: Some(("action".to_string(), vec!["left".to_string(), "right".to_string()])),
        });
        let mut sample = Sample::raw("action = up", 5);
        sample.action = "up".to_string();
        apply(&mut sample, &config(), &step);
        assert!(sample.red_flagged);
    }

    #[test]
    fn clean_sample_passes_through() {
        let mut sample = Sample::raw("action = move", 5);
        sample.action = "move".to_string();
        apply(&mut sample, &config(), &step());
        assert!(!sample.red_flagged);
    }
}
