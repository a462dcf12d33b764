//! Formatting options.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Option name to value, merged key by key.
///
/// Keys the host does not know are carried through to the engine untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatConfig(Map<String, Value>);

impl FormatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options applied when no other source sets them.
    pub fn defaults() -> Self {
        let value = json!({
            "printWidth": 80,
            "tabWidth": 2,
            "useTabs": false,
            "semi": true,
            "singleQuote": false,
            "bracketSpacing": true,
        });
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Overrides keys in `self` with every key present in `other`.
    pub fn merge(&mut self, other: &FormatConfig) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Returns `self` merged with `other`.
    pub fn merged(mut self, other: &FormatConfig) -> Self {
        self.merge(other);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for FormatConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
