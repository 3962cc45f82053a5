//! The input data model (§3): a [`PipelineDescription`] is the immutable
//! description the Step Loop executes; [`MicrostepDefinition`] describes one
//! named unit of decomposed work.

use crate::config::DeclaredConfig;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// How many iterations the Step Loop runs.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TotalSteps {
    Fixed(u64),
    /// `total_steps: infer` — delegates to an external estimator this crate
    /// does not implement (§9 open question). Resolving a pipeline whose
    /// `total_steps` is `Infer` is a configuration error; a caller that
    /// wants this must supply a `Fixed` count itself.
    Infer,
}

impl<'de> Deserialize<'de> for TotalSteps {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(TotalSteps::Fixed(n)),
            Raw::Text(s) if s.eq_ignore_ascii_case("infer") => Ok(TotalSteps::Infer),
            Raw::Text(s) => Err(serde::de::Error::custom(format!(
                "total_steps must be an integer or \"infer\", got \"{s}\""
            ))),
        }
    }
}

/// Step-declared red-flag predicates (§4.5 rule 5), evaluated as a
/// conjunction in declaration order: `regex`, then `contains`, then
/// `not_in`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedFlagRules {
    /// Content must not match this pattern.
    #[serde(default)]
    pub regex: Option<String>,
    /// Content must not contain this substring.
    #[serde(default)]
    pub contains: Option<String>,
    /// `(field, allowed values)`: if `field` was extracted, its value must
    /// be one of `allowed`.
    #[serde(default)]
    pub not_in: Option<(String, Vec<String>)>,
}

/// One named unit of decomposed work (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicrostepDefinition {
    pub name: String,
    /// Agent reference: the model and system prompt to use.
    #[serde(rename = "use")]
    pub agent: Value,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub context: Option<Value>,
    #[serde(default)]
    pub output_schema: Option<Value>,
    #[serde(default)]
    pub red_flags: Option<RedFlagRules>,
}

/// The immutable description of an MDAP run (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDescription {
    /// Possibly empty; an empty list means microsteps are synthesized
    /// dynamically (§4.2 step 2, S6).
    #[serde(default)]
    pub microsteps: Vec<MicrostepDefinition>,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub mdap_config: DeclaredConfig,
    pub total_steps: TotalSteps,
    pub input: Value,
    /// Agent reference used for a synthesized microstep (§4.2 step 2) when
    /// `microsteps` is empty. The distilled property surface doesn't name
    /// this field explicitly — it's needed for S6-style dynamic pipelines
    /// to have anyone to ask — so it's optional and synthesis fails with a
    /// resolve error if neither this nor any declared microstep supplies
    /// an agent.
    #[serde(default)]
    pub default_agent: Option<Value>,
}

impl MicrostepDefinition {
    /// Synthesize the generic microstep the Step Loop falls back to when
    /// the pipeline declares no microstep at `step_index` (§4.2 step 2).
    pub fn synthesize(step_index: u64, agent: Value) -> Self {
        Self {
            name: format!("step-{step_index}"),
            agent,
            prompt: None,
            context: None,
            output_schema: None,
            red_flags: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_steps_accepts_either_an_integer_or_infer() {
        let fixed: TotalSteps = serde_json::from_str("7").unwrap();
        assert!(matches!(fixed, TotalSteps::Fixed(7)));

        let inferred: TotalSteps = serde_json::from_str("\"infer\"").unwrap();
        assert!(matches!(inferred, TotalSteps::Infer));

        assert!(serde_json::from_str::<TotalSteps>("\"later\"").is_err());
    }

    #[test]
    fn synthesized_microstep_is_named_by_index() {
        let step = MicrostepDefinition::synthesize(4, Value::from("agent"));
        assert_eq!(step.name, "step-4");
        assert!(step.prompt.is_none());
    }
}
