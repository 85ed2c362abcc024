//! Calculator content and variant identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Full exportable state of a calculator surface.
///
/// The value is opaque to the panel manager. Equality is structural: objects
/// compare by key/value pairs regardless of the order the keys were written
/// in, so two states that only differ in key ordering are the same content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Content(serde_json::Value);

impl Content {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Parse content from raw JSON text (an imported file, a host message).
    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw).map(Self)
    }

    /// Pretty-printed JSON with a two-space indent, the export file layout.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.0)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for Content {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Which flavor of the calculator surface produced a session or entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(String);

impl VariantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VariantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for VariantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equality_ignores_key_order() {
        let a = Content::from_json_str(r#"{"version":11,"expressions":{"list":[1,2]}}"#).unwrap();
        let b = Content::from_json_str(r#"{"expressions":{"list":[1,2]},"version":11}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_is_deep() {
        let a = Content::new(json!({"graph": {"viewport": {"xmin": -10}}}));
        let b = Content::new(json!({"graph": {"viewport": {"xmin": -9}}}));
        assert_ne!(a, b);
    }

    #[test]
    fn test_array_order_matters() {
        assert_ne!(Content::new(json!([1, 2])), Content::new(json!([2, 1])));
    }

    #[test]
    fn test_pretty_json_uses_two_space_indent() {
        let content = Content::new(json!({"x": 1}));
        assert_eq!(content.to_pretty_json().unwrap(), "{\n  \"x\": 1\n}");
    }
}
