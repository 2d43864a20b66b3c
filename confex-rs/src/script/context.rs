//! Evaluation context: the read-only mapping that `lookup()` walks.

use std::collections::BTreeMap;

use thiserror::Error;

use super::value::Value;

/// Error building a [`Context`] from JSON.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("context must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// String-keyed, arbitrarily nested mapping of values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    root: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.root.insert(key.into(), value.into());
    }

    /// Top-level entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Walk a dotted path (`sensor.temp`).  Returns `None` as soon as a
    /// segment is missing or an intermediate value is not a map.
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for seg in segments {
            current = current.get(seg)?;
        }
        Some(current)
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Build from a JSON object.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ContextError> {
        use serde_json::Value as Json;
        let obj = match json {
            Json::Object(obj) => obj,
            Json::Null => return Err(ContextError::NotAnObject("null")),
            Json::Bool(_) => return Err(ContextError::NotAnObject("boolean")),
            Json::Number(_) => return Err(ContextError::NotAnObject("number")),
            Json::String(_) => return Err(ContextError::NotAnObject("string")),
            Json::Array(_) => return Err(ContextError::NotAnObject("array")),
        };
        let root = obj
            .iter()
            .map(|(k, v)| (k.clone(), Value::from_json(v)))
            .collect();
        Ok(Context { root })
    }

    pub fn from_json_str(s: &str) -> Result<Self, ContextError> {
        let json: serde_json::Value = serde_json::from_str(s)?;
        Self::from_json(&json)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Context::new();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
