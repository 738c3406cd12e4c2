//! Node add/remove hook.
//!
//! Requests carry a `type` of `add` or `remove` together with a free-form
//! payload. What a node edit means is left to the host: the pipeline only
//! dispatches to a [`NodeEditor`], and the default editor changes nothing.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as Payload;

use crate::document::Document;
use crate::editor::types::EditError;

/// The edit requested alongside a subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    Add,
    Remove,
    /// Any other value, including a missing `type`.
    #[default]
    #[serde(other)]
    None,
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditKind::Add => "add",
            EditKind::Remove => "remove",
            EditKind::None => "none",
        };
        f.write_str(name)
    }
}

/// Pluggable node editing.
///
/// Both methods default to leaving the document untouched.
pub trait NodeEditor: Send + Sync {
    fn add_nodes(&self, document: &mut Document, payload: &Payload) -> Result<(), EditError> {
        let _ = (document, payload);
        Ok(())
    }

    fn remove_nodes(&self, document: &mut Document, payload: &Payload) -> Result<(), EditError> {
        let _ = (document, payload);
        Ok(())
    }
}

/// The default editor: every node edit is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNodeEditor;

impl NodeEditor for IdentityNodeEditor {}

/// Dispatch a request's node edit to `editor`.
pub fn apply_node_edits(
    editor: &dyn NodeEditor,
    document: &mut Document,
    kind: EditKind,
    payload: &Payload,
) -> Result<(), EditError> {
    match kind {
        EditKind::Add => editor.add_nodes(document, payload),
        EditKind::Remove => editor.remove_nodes(document, payload),
        EditKind::None => Ok(()),
    }
}
