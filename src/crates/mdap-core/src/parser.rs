//! The Response Parser (§4.7): line-scanning extraction of `action` and
//! `next_state` out of raw sample content.

use crate::pipeline::MicrostepDefinition;
use crate::value::Value;

/// Extract `action_key`/`state_key` overrides from a step's
/// `output_schema`, when declared as `{"action_key": "...", "state_key":
/// "..."}`. Any other schema shape is ignored here — the schema is
/// advisory for parsing (§4.7: "the schema is advisory, not enforced at
/// this layer").
fn schema_keys(step: &MicrostepDefinition) -> (Option<String>, Option<String>) {
    let Some(schema) = step.output_schema.as_ref().and_then(Value::as_object) else {
        return (None, None);
    };
    let action_key = schema.get("action_key").and_then(Value::as_str).map(str::to_lowercase);
    let state_key = schema.get("state_key").and_then(Value::as_str).map(str::to_lowercase);
    (action_key, state_key)
}

/// Parse `action` and `next_state` out of one sample's raw content.
///
/// Lines beginning (case-insensitively) with `move`, `action`, or a
/// schema-declared action key, followed by `=`, supply `action`; lines
/// beginning with `next_state` or a schema-declared state key supply
/// `next_state`. When no action line was found and the step declares no
/// output schema, the full trimmed content is used as the action — the
/// arbiter's fallback for free-form, schema-less steps (§4.6 step 2).
pub fn parse(content: &str, step: &MicrostepDefinition) -> (String, Value) {
    let (action_key, state_key) = schema_keys(step);

    let mut action = String::new();
    let mut next_state = Value::Null;

    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        if action.is_empty() && is_action_key(&key, action_key.as_deref()) {
            action = value.to_string();
        } else if matches!(&next_state, Value::Null) && is_state_key(&key, state_key.as_deref()) {
            next_state = Value::parse_literal(value);
        }
    }

    if action.is_empty() && step.output_schema.is_none() {
        action = content.trim().to_string();
    }

    (action, next_state)
}

fn is_action_key(key: &str, schema_key: Option<&str>) -> bool {
    key == "move" || key == "action" || schema_key.is_some_and(|k| key == k)
}

fn is_state_key(key: &str, schema_key: Option<&str>) -> bool {
    key == "next_state" || schema_key.is_some_and(|k| key == k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use indexmap::IndexMap;

    fn step() -> MicrostepDefinition {
        MicrostepDefinition::synthesize(0, Value::from("agent"))
    }

    #[test]
    fn extracts_action_and_next_state_regardless_of_order() {
        let content = "next_state = {\"pegs\": {}}\naction = move disk 1 from A to C";
        let (action, next_state) = parse(content, &step());
        assert_eq!(action, "move disk 1 from A to C");
        assert!(next_state.as_object().is_some());
    }

    #[test]
    fn accepts_move_as_an_action_alias() {
        let (action, _) = parse("move = disk 1 to C", &step());
        assert_eq!(action, "disk 1 to C");
    }

    #[test]
    fn falls_back_to_full_content_when_schema_is_absent() {
        let (action, _) = parse("just do the thing", &step());
        assert_eq!(action, "just do the thing");
    }

    #[test]
    fn does_not_fall_back_when_step_declares_a_schema() {
        let mut s = step();
        s.output_schema = Some(Value::object());
        let (action, _) = parse("no recognizable key here", &s);
        assert!(action.is_empty());
    }

    #[test]
    fn honors_schema_declared_action_key() {
        let mut s = step();
        let mut schema = IndexMap::new();
        schema.insert("action_key".to_string(), Value::from("decision"));
        s.output_schema = Some(Value::Object(schema));

        let (action, _) = parse("decision = attack", &s);
        assert_eq!(action, "attack");
    }

    #[test]
    fn next_state_falls_back_to_raw_string_for_non_json() {
        let (_, next_state) = parse("action = go\nnext_state = somewhere", &step());
        assert_eq!(next_state, Value::String("somewhere".to_string()));
    }
}
