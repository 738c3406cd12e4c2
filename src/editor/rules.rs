//! Rule list edits.

use serde_yaml::Value;

use crate::document::Document;
use crate::editor::types::EditError;
use crate::fetch::SubscriptionFetcher;

/// Policy attached to appended rule-set references.
pub const RULE_SET_POLICY: &str = "DIRECT";

/// The rule string referencing a remote rule-set.
pub fn rule_set_reference(rules_url: &str) -> String {
    format!("RULE-SET: {}, {}", rules_url, RULE_SET_POLICY)
}

/// Append a rule-set reference to `rules`, creating the list if needed.
pub fn append_rule_reference(document: &mut Document, rules_url: &str) -> Result<(), EditError> {
    let rule = Value::String(rule_set_reference(rules_url));

    match document.get_mut("rules") {
        Some(Value::Sequence(rules)) => rules.push(rule),
        None | Some(Value::Null) => {
            document.insert("rules", Value::Sequence(vec![rule]));
        }
        Some(_) => {
            return Err(EditError::FieldType {
                field: "rules",
                expected: "a sequence",
            })
        }
    }
    Ok(())
}

/// Check that the remote rule-set is reachable, then reference it.
///
/// The fetched body is discarded. On fetch failure the document is left
/// unchanged.
pub async fn append_remote_rule(
    document: &mut Document,
    fetcher: &SubscriptionFetcher,
    rules_url: &str,
) -> Result<(), EditError> {
    let body = fetcher.fetch(rules_url).await?;
    tracing::debug!(rules_url = %rules_url, bytes = body.len(), "Remote rule-set reachable");
    append_rule_reference(document, rules_url)
}
