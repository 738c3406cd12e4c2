//! DNS nameserver edits.

use serde_yaml::Value;

use crate::document::Document;

/// Drop every `dns.nameserver` entry equal to `address`.
///
/// Returns the number of entries removed. Absent or non-sequence fields are
/// left alone.
pub fn remove_nameserver(document: &mut Document, address: &str) -> usize {
    let Some(servers) = document
        .get_mut("dns")
        .and_then(|dns| dns.get_mut("nameserver"))
        .and_then(Value::as_sequence_mut)
    else {
        return 0;
    };

    let before = servers.len();
    servers.retain(|entry| entry.as_str() != Some(address));
    before - servers.len()
}
