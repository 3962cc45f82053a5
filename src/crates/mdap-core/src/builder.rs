//! The Microstep Builder (§4.3): pure prompt assembly.
//!
//! No I/O, no randomness: identical inputs produce byte-identical prompts,
//! which keeps provider-side caching and test fixtures reliable.

use crate::pipeline::MicrostepDefinition;
use crate::value::Value;

const RELIABILITY_PREAMBLE: &str = "## Required Output Format\n\
Respond with exactly two lines and nothing else:\n\
action = <the action you are taking>\n\
next_state = <the resulting state>\n\
Do not include explanations, markdown, or any text outside these two lines. \
A response that does not match this format will be rejected.";

/// Assemble the single user-facing prompt for one microstep at the current
/// state, in the fixed section order §4.3 specifies.
pub fn build_prompt(strategy: &str, state: &Value, last_action: &str, step: &MicrostepDefinition) -> String {
    let mut sections = Vec::new();

    if !strategy.is_empty() {
        sections.push(format!("## Strategy\n{strategy}"));
    }

    sections.push(format!("## Current State\n{}", state.render_canonical()));

    if !last_action.is_empty() {
        sections.push(format!("## Previous Action\n{last_action}"));
    }

    if let Some(prompt) = &step.prompt {
        sections.push(format!("## Task\n{prompt}"));
    }

    sections.push(RELIABILITY_PREAMBLE.to_string());

    sections.join("\n\n")
}

/// Append the fixed reliability preamble to an agent's configured system
/// prompt.
pub fn build_system_prompt(agent_system_prompt: &str) -> String {
    format!(
        "{agent_system_prompt}\n\n\
Be exact, be concise, and never explain yourself. \
A malformed response will be discarded and counted against this run."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::MicrostepDefinition;

    #[test]
    fn omits_empty_sections() {
        let step = MicrostepDefinition::synthesize(0, Value::from("agent"));
        let prompt = build_prompt("", &Value::object(), "", &step);
        assert!(!prompt.contains("## Strategy"));
        assert!(!prompt.contains("## Previous Action"));
        assert!(!prompt.contains("## Task"));
        assert!(prompt.contains("## Current State"));
        assert!(prompt.contains("## Required Output Format"));
    }

    #[test]
    fn includes_all_sections_when_present() {
        let mut step = MicrostepDefinition::synthesize(1, Value::from("agent"));
        step.prompt = Some("move a disk".to_string());
        let prompt = build_prompt("stack rules", &Value::from("start"), "moved disk 1", &step);
        assert!(prompt.contains("## Strategy\nstack rules"));
        assert!(prompt.contains("## Previous Action\nmoved disk 1"));
        assert!(prompt.contains("## Task\nmove a disk"));
    }

    #[test]
    fn identical_inputs_produce_identical_prompts() {
        let step = MicrostepDefinition::synthesize(0, Value::from("agent"));
        let a = build_prompt("s", &Value::from("x"), "y", &step);
        let b = build_prompt("s", &Value::from("x"), "y", &step);
        assert_eq!(a, b);
    }

    #[test]
    fn object_key_order_does_not_affect_rendered_prompt() {
        use indexmap::IndexMap;

        let mut m1 = IndexMap::new();
        m1.insert("b".to_string(), Value::from(2.0));
        m1.insert("a".to_string(), Value::from(1.0));

        let mut m2 = IndexMap::new();
        m2.insert("a".to_string(), Value::from(1.0));
        m2.insert("b".to_string(), Value::from(2.0));

        let step = MicrostepDefinition::synthesize(0, Value::from("agent"));
        let p1 = build_prompt("", &Value::Object(m1), "", &step);
        let p2 = build_prompt("", &Value::Object(m2), "", &step);
        assert_eq!(p1, p2);
    }
}
