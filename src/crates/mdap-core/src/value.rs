//! The open/closed value union threaded as execution state.
//!
//! `Value` is the tagged-variant union the executor substitutes into prompts
//! and records at checkpoints. It intentionally does not reuse
//! `serde_json::Value` directly: the entity layer this crate sits behind
//! recognizes a `Reference` kind (`agent("x")`, `file("y")`) that JSON has no
//! native representation for, and `Object` needs insertion-order iteration
//! (not a `BTreeMap`'s sorted order) so that field-presence red-flag checks
//! see fields in the order the pipeline author declared them.
//!
//! Extend this union by adding a variant, not by subclassing. A value kind
//! the entity layer introduces that this crate doesn't recognize degrades to
//! an opaque [`Value::Reference`] rather than failing to parse.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, typed reference such as `agent("planner")` or `file("strategy")`.
///
/// Also the landing spot for value kinds this crate doesn't otherwise
/// recognize: an unrecognized `kind` is carried opaquely rather than
/// rejected, per the open/closed extension rule in the design notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub kind: String,
    pub name: String,
}

impl Reference {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(\"{}\")", self.kind, self.name)
    }
}

/// The executor's recognized value space.
///
/// `Object` preserves insertion order ([`IndexMap`]) rather than sorting
/// keys: the pipeline author's declaration order is meaningful for
/// field-presence checks, even though canonical rendering (§4.3) sorts keys
/// for display so that two objects built in a different order still render
/// byte-identical prompt text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Reference(Reference),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    pub fn object() -> Self {
        Value::Object(IndexMap::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render this value into canonical, deterministic text for prompt
    /// assembly. Object keys are sorted lexically so that identical data
    /// built through different declaration orders still renders identically
    /// (the builder's purity requirement, §4.3); array order is preserved
    /// since arrays are positional rather than keyed.
    pub fn render_canonical(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        match self {
            Value::Null => out.push_str("null"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    out.push_str(&format!("{}", *n as i64));
                } else {
                    out.push_str(&n.to_string());
                }
            }
            Value::String(s) => out.push_str(s),
            Value::Reference(r) => out.push_str(&r.to_string()),
            Value::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.render_into(out);
                }
                out.push(']');
            }
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                out.push('{');
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(key);
                    out.push_str(": ");
                    map[*key].render_into(out);
                }
                out.push('}');
            }
        }
    }

    /// Parse a single scalar/structured literal from response-parser
    /// extraction (§4.7): JSON-looking text (`{...}`, `[...]`, quoted
    /// strings, numbers, booleans, `null`) maps to the matching variant;
    /// anything else is kept as a raw string so the parser stays
    /// schema-agnostic.
    pub fn parse_literal(text: &str) -> Value {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Value::String(String::new());
        }
        if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
            return Value::from_json(v);
        }
        Value::String(trimmed.to_string())
    }

    fn from_json(v: serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                let mut out = IndexMap::new();
                for (k, v) in map {
                    out.insert(k, Value::from_json(v));
                }
                Value::Object(out)
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
