//! Field-level edits over a subscription document.
//!
//! # Data Flow
//! ```text
//! Document
//!     → dns.rs::remove_nameserver
//!     → groups.rs::set_proxy_group_url
//!     → rules.rs::append_remote_rule (one network call)
//!     → nodes.rs (NodeEditor hook, identity by default)
//!     → Document
//! ```
//!
//! # Design Decisions
//! - Edits mutate in place and never fail on absent fields
//! - Only the rule append reads the network; the other edits are pure
//! - Node add/remove is a trait so hosts can plug in real behaviour

pub mod dns;
pub mod groups;
pub mod nodes;
pub mod rules;
pub mod types;

pub use dns::remove_nameserver;
pub use groups::set_proxy_group_url;
pub use nodes::{apply_node_edits, EditKind, IdentityNodeEditor, NodeEditor};
pub use rules::{append_remote_rule, append_rule_reference, rule_set_reference};
pub use types::EditError;
