//! Subscription rewrite pipeline.
//!
//! # Data Flow
//! ```text
//! SubscriptionRequest
//!     → Fetched          (SubscriptionFetcher::fetch)
//!     → Decoded          (fetch::resolve_body)
//!     → DnsEdited        (editor::remove_nameserver)
//!     → UrlEdited        (editor::set_proxy_group_url)
//!     → RulesEdited      (editor::append_remote_rule)
//!     → NodesEdited      (NodeEditor hook)
//!     → Encoded          (document::dump, optionally codec::encode)
//!     → SubscriptionResponse { url } | { error }
//! ```
//!
//! # Design Decisions
//! - Every stage returns a typed error; the prefix is attached once, at the end
//! - No partial results: a failure anywhere yields only `{ error }`
//! - An unreachable rule-set skips the rule unless `remote_rules_optional` is off
//! - The pipeline is immutable; config reloads build a new one that keeps
//!   the node editor

pub mod controller;
pub mod types;

pub use controller::Pipeline;
pub use types::{
    OutputFormat, PipelineError, Stage, SubscriptionRequest, SubscriptionResponse,
};
