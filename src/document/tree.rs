//! Untyped YAML tree for subscription documents.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Errors produced while reading or writing a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The text is not well-formed YAML.
    #[error("malformed YAML: {0}")]
    Malformed(#[source] serde_yaml::Error),

    /// The document root is a scalar or a sequence.
    #[error("expected a mapping at the document root, found {0}")]
    NotAMapping(&'static str),

    /// The tree could not be serialized back to YAML.
    #[error("failed to serialize document: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// A parsed subscription document.
///
/// Wraps the root mapping of the YAML tree. Optional fields are looked up
/// on demand; nothing is validated beyond the root type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: Mapping,
}

impl Document {
    /// Create a document from an existing root mapping.
    pub fn from_mapping(root: Mapping) -> Self {
        Self { root }
    }

    /// Parse YAML text into a document.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_yaml::from_str(text).map_err(DocumentError::Malformed)?;
        match value {
            Value::Mapping(root) => Ok(Self { root }),
            Value::Null => Ok(Self::default()),
            other => Err(DocumentError::NotAMapping(kind_of(&other))),
        }
    }

    /// Serialize the document back to YAML text.
    pub fn dump(&self) -> Result<String, DocumentError> {
        serde_yaml::to_string(&self.root).map_err(DocumentError::Serialize)
    }

    /// Top-level field lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Mutable top-level field lookup.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.root.get_mut(key)
    }

    /// Insert or replace a top-level field.
    pub fn insert(&mut self, key: &str, value: Value) -> Option<Value> {
        self.root.insert(Value::String(key.to_string()), value)
    }

    /// The root mapping.
    pub fn root(&self) -> &Mapping {
        &self.root
    }
}

/// Parse YAML text into a document.
pub fn parse(text: &str) -> Result<Document, DocumentError> {
    Document::parse(text)
}

/// Serialize a document to YAML text.
pub fn dump(document: &Document) -> Result<String, DocumentError> {
    document.dump()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
