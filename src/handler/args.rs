//! Argument shapes handed to invoked handlers, and how returned values are
//! read as booleans.

use serde_json::Value;

use crate::routing::params::Params;

/// Arguments for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Args {
    /// No arguments at all.
    None,
    /// A single value (error handlers receive their message this way).
    One(Option<String>),
    /// Positional values; `None` marks a placeholder with no capture.
    List(Vec<Option<String>>),
    /// Captured route parameters, handed to route targets.
    Params(Params),
}

impl Args {
    /// Flattens any shape into positional values.
    pub fn positional(&self) -> Vec<Option<String>> {
        match self {
            Args::None => Vec::new(),
            Args::One(value) => vec![value.clone()],
            Args::List(values) => values.clone(),
            Args::Params(params) => params.values().into_iter().map(Some).collect(),
        }
    }

    /// Positional value at `index`, if present and not missing.
    pub fn get(&self, index: usize) -> Option<String> {
        self.positional().into_iter().nth(index).flatten()
    }

    /// Looks up a captured parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        match self {
            Args::Params(params) => params.get(name),
            _ => None,
        }
    }
}

/// Loose truthiness: `null`, `false`, `0`, `""`, `"0"` and empty collections
/// deny; everything else allows.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
