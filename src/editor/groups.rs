//! Proxy group edits.

use serde_yaml::Value;

use crate::document::Document;

/// Overwrite `url` on every proxy group that already has one.
///
/// Groups without a `url` key are not touched. Returns the number of groups
/// updated.
pub fn set_proxy_group_url(document: &mut Document, new_url: &str) -> usize {
    let Some(groups) = document
        .get_mut("proxy-groups")
        .and_then(Value::as_sequence_mut)
    else {
        return 0;
    };

    let mut updated = 0;
    for group in groups.iter_mut().filter_map(Value::as_mapping_mut) {
        if let Some(url) = group.get_mut("url") {
            *url = Value::String(new_url.to_string());
            updated += 1;
        }
    }
    updated
}
