//! Resolution of entity references (§6: "Entity description inputs") into
//! concrete provider parameters.
//!
//! Resolving `agent("planner")` into a model id and system prompt is a
//! workspace/registry concern the spec places outside this core. This
//! module defines the seam a host application implements; [`StaticAgentResolver`]
//! is a test double in the same spirit as `mdap_llm::ScriptedProvider`.

use crate::error::{MdapError, Result};
use crate::value::Value;
use std::collections::HashMap;

/// One resolved agent: the model id and system prompt a microstep's `use`
/// reference maps to.
#[derive(Debug, Clone)]
pub struct ResolvedAgent {
    pub model: String,
    pub system_prompt: String,
}

/// Resolves an agent reference declared in a microstep's `use` field.
pub trait AgentResolver: Send + Sync {
    fn resolve(&self, agent_ref: &Value) -> Result<ResolvedAgent>;
}

/// A fixed table of `agent("name")` references to model/prompt pairs, for
/// tests and small deployments that don't need a real registry.
#[derive(Debug, Clone, Default)]
pub struct StaticAgentResolver {
    agents: HashMap<String, ResolvedAgent>,
}

impl StaticAgentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agent(mut self, name: impl Into<String>, model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        self.agents.insert(
            name.into(),
            ResolvedAgent {
                model: model.into(),
                system_prompt: system_prompt.into(),
            },
        );
        self
    }
}

impl AgentResolver for StaticAgentResolver {
    fn resolve(&self, agent_ref: &Value) -> Result<ResolvedAgent> {
        let name = match agent_ref {
            Value::Reference(r) => r.name.clone(),
            Value::String(s) => s.clone(),
            other => {
                return Err(MdapError::resolve(
                    other.render_canonical(),
                    "agent reference must be a reference or string",
                ))
            }
        };

        self.agents
            .get(&name)
            .cloned()
            .ok_or_else(|| MdapError::resolve(name, "no such agent in resolver"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Reference;

    #[test]
    fn resolves_a_registered_reference() {
        let resolver = StaticAgentResolver::new().with_agent("planner", "gpt-x", "be terse");
        let resolved = resolver
            .resolve(&Value::Reference(Reference::new("agent", "planner")))
            .unwrap();
        assert_eq!(resolved.model, "gpt-x");
    }

    #[test]
    fn unregistered_reference_is_a_resolve_error() {
        let resolver = StaticAgentResolver::new();
        let err = resolver
            .resolve(&Value::Reference(Reference::new("agent", "nope")))
            .unwrap_err();
        assert!(matches!(err, MdapError::Resolve { .. }));
    }
}
