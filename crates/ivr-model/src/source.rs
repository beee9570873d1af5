//! Source data collected by the order workflow.

use serde::{Deserialize, Serialize};

/// Closed set of value kinds a source field may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Number,
    Bool,
    List,
}

impl ValueType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::List => "list",
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque payload of a source field. The engine only ever looks at the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<SourceValue>),
}

impl SourceValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::String(_) => ValueType::String,
            Self::Number(_) => ValueType::Number,
            Self::Bool(_) => ValueType::Bool,
            Self::List(_) => ValueType::List,
        }
    }
}

impl From<&str> for SourceValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for SourceValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for SourceValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for SourceValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One datum supplied by the calling workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceField {
    /// Internal key, usually snake_case (e.g. `patient_name`).
    pub key: String,
    /// Payload; never inspected by the mapping engine.
    pub value: SourceValue,
}

impl SourceField {
    pub fn new(key: impl Into<String>, value: impl Into<SourceValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Kind of the carried value.
    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }
}
