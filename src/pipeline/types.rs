//! Pipeline message and error types.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as Payload;
use thiserror::Error;

use crate::document::DocumentError;
use crate::editor::{EditError, EditKind};
use crate::fetch::{FetchError, FetchErrorKind};

/// Inbound message: one per invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    /// Location of the subscription document.
    pub url: String,

    /// Node edit to apply, if any.
    #[serde(rename = "type", default)]
    pub kind: EditKind,

    /// Node edit data, interpreted by the node editor.
    #[serde(default)]
    pub payload: Payload,

    /// Representation of the rewritten document.
    #[serde(default)]
    pub format: OutputFormat,
}

impl SubscriptionRequest {
    /// A request with no node edit and YAML output.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: EditKind::None,
            payload: Payload::Null,
            format: OutputFormat::Yaml,
        }
    }
}

/// How the rewritten document is returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain YAML text.
    #[default]
    Yaml,
    /// YAML wrapped in base64.
    Base64,
}

/// Outbound message: exactly one per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubscriptionResponse {
    /// The rewritten document.
    Success { url: String },
    /// What went wrong, prefixed with the failing stage.
    Failure { error: String },
}

impl SubscriptionResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, SubscriptionResponse::Success { .. })
    }
}

impl From<Result<String, PipelineError>> for SubscriptionResponse {
    fn from(result: Result<String, PipelineError>) -> Self {
        match result {
            Ok(url) => SubscriptionResponse::Success { url },
            Err(e) => SubscriptionResponse::from(e),
        }
    }
}

impl From<PipelineError> for SubscriptionResponse {
    fn from(error: PipelineError) -> Self {
        SubscriptionResponse::Failure {
            error: error.to_string(),
        }
    }
}

/// Pipeline progress, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Fetched,
    Decoded,
    DnsEdited,
    UrlEdited,
    RulesEdited,
    NodesEdited,
    Encoded,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Fetched => "fetched",
            Stage::Decoded => "decoded",
            Stage::DnsEdited => "dns_edited",
            Stage::UrlEdited => "url_edited",
            Stage::RulesEdited => "rules_edited",
            Stage::NodesEdited => "nodes_edited",
            Stage::Encoded => "encoded",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A failed pipeline run. The message carries the stage prefix.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The subscription could not be fetched, decoded or parsed.
    #[error("Failed to decode subscription: {0}")]
    Subscription(#[source] FetchError),

    /// The remote rule-set could not be fetched.
    #[error("Failed to fetch remote rules: {0}")]
    RemoteRules(#[source] FetchError),

    /// An edit could not be applied.
    #[error("Failed to process subscription: {0}")]
    Edit(#[source] EditError),

    /// The edited document could not be serialized.
    #[error("Failed to process subscription: {0}")]
    Encode(#[source] DocumentError),

    /// The request ran past its deadline.
    #[error("Failed to process subscription: timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl PipelineError {
    /// True when the failure came from an upstream HTTP call.
    pub fn is_network(&self) -> bool {
        match self {
            PipelineError::Subscription(e) | PipelineError::RemoteRules(e) => {
                e.kind() == FetchErrorKind::Network
            }
            PipelineError::Edit(_) | PipelineError::Encode(_) | PipelineError::Timeout(_) => false,
        }
    }

    /// True when the request itself was unusable.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, PipelineError::Subscription(e) if e.kind() == FetchErrorKind::InvalidUrl)
    }

    /// Short label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            PipelineError::Subscription(e) => match e.kind() {
                FetchErrorKind::InvalidUrl => "subscription_invalid_url",
                FetchErrorKind::Network => "subscription_network",
                FetchErrorKind::Decode => "subscription_decode",
                FetchErrorKind::Parse => "subscription_parse",
                FetchErrorKind::UnsupportedFormat => "subscription_unsupported",
            },
            PipelineError::RemoteRules(_) => "remote_rules",
            PipelineError::Edit(_) => "edit",
            PipelineError::Encode(_) => "encode",
            PipelineError::Timeout(_) => "timeout",
        }
    }
}

impl From<EditError> for PipelineError {
    fn from(error: EditError) -> Self {
        match error {
            EditError::RemoteRules(e) => PipelineError::RemoteRules(e),
            other => PipelineError::Edit(other),
        }
    }
}
