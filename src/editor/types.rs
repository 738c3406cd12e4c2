//! Edit error definitions.

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that can occur while editing a document.
#[derive(Debug, Error)]
pub enum EditError {
    /// A field exists but has the wrong shape for the edit.
    #[error("field `{field}` must be {expected}")]
    FieldType {
        field: &'static str,
        expected: &'static str,
    },

    /// The remote rule-set could not be fetched.
    #[error(transparent)]
    RemoteRules(#[from] FetchError),

    /// A node-editing hook rejected its payload.
    #[error("node edit rejected: {0}")]
    Nodes(String),
}
