//! Keyword options passed to handlers
//!
//! Each format declares read and write defaults; caller options are laid
//! over them and the merged map is deserialized into the format's own
//! options struct, so unknown keys are ignored and missing keys fall back to
//! serde defaults.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options(Map<String, Value>);

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.set(key, value);
        self
    }

    pub fn set<V: Into<Value>>(&mut self, key: &str, value: V) {
        let _ = self.0.insert(key.to_string(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Boolean option; absent or non-boolean values read as `false`
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `overrides` laid over `defaults`
    #[must_use]
    pub fn overlay(defaults: &Options, overrides: &Options) -> Options {
        let mut merged = defaults.0.clone();
        for (key, value) in &overrides.0 {
            let _ = merged.insert(key.clone(), value.clone());
        }
        Options(merged)
    }

    /// Deserialize into a typed options struct
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, String> {
        serde_json::from_value(Value::Object(self.0.clone())).map_err(|e| e.to_string())
    }

    /// Parse a `key=value` assignment. The value is read as JSON when it
    /// parses (`true`, `0`, `"x"`, `[1,2]`), otherwise kept as a string.
    pub fn parse_assignment(assignment: &str) -> Result<(String, Value), String> {
        let (key, raw) = assignment
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got '{assignment}'"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("empty option name in '{assignment}'"));
        }
        let value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Ok((key.to_string(), value))
    }
}

impl From<Map<String, Value>> for Options {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Options {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
