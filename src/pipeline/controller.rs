//! Pipeline orchestration.
//!
//! # Responsibilities
//! - Run the stages in order for one request
//! - Log each transition with the request URL
//! - Convert any failure into the uniform `{ error }` response

use std::sync::Arc;
use std::time::Instant;

use crate::codec;
use crate::config::{EditConfig, RewriterConfig};
use crate::document::Document;
use crate::editor::{self, IdentityNodeEditor, NodeEditor};
use crate::fetch::{self, FetchError, SubscriptionFetcher};
use crate::observability::metrics;
use crate::pipeline::types::{
    OutputFormat, PipelineError, Stage, SubscriptionRequest, SubscriptionResponse,
};

/// The subscription rewrite pipeline.
///
/// Holds no per-request state; one instance serves any number of
/// concurrent invocations.
#[derive(Clone)]
pub struct Pipeline {
    fetcher: SubscriptionFetcher,
    edits: EditConfig,
    node_editor: Arc<dyn NodeEditor>,
}

impl Pipeline {
    /// Create a pipeline with the identity node editor.
    pub fn new(fetcher: SubscriptionFetcher, edits: EditConfig) -> Self {
        Self {
            fetcher,
            edits,
            node_editor: Arc::new(IdentityNodeEditor),
        }
    }

    /// Build a pipeline from the full configuration.
    pub fn from_config(config: &RewriterConfig) -> Result<Self, FetchError> {
        let fetcher = SubscriptionFetcher::new(&config.fetch)?;
        Ok(Self::new(fetcher, config.edits.clone()))
    }

    /// Rebuild for a reloaded configuration.
    ///
    /// The node editor carries over. The fetcher is replaced only when the
    /// fetch settings changed.
    pub fn rebuild(&self, config: &RewriterConfig) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: self.fetcher.reconfigure(&config.fetch)?,
            edits: config.edits.clone(),
            node_editor: Arc::clone(&self.node_editor),
        })
    }

    /// Replace the node editor.
    pub fn with_node_editor(mut self, node_editor: Arc<dyn NodeEditor>) -> Self {
        self.node_editor = node_editor;
        self
    }

    pub fn edits(&self) -> &EditConfig {
        &self.edits
    }

    /// Run one invocation and produce exactly one response.
    pub async fn process_subscription(&self, request: SubscriptionRequest) -> SubscriptionResponse {
        SubscriptionResponse::from(self.execute(&request).await)
    }

    /// Run one invocation, logging and recording its outcome.
    pub async fn execute(&self, request: &SubscriptionRequest) -> Result<String, PipelineError> {
        let start = Instant::now();
        let result = self.run(request).await;

        match &result {
            Ok(_) => metrics::record_pipeline("success", start),
            Err(e) => {
                tracing::warn!(
                    url = %request.url,
                    stage = %Stage::Failed,
                    error = %e,
                    "Subscription rewrite failed"
                );
                metrics::record_pipeline(e.outcome(), start);
            }
        }

        result
    }

    /// Run the stages, returning the encoded document.
    async fn run(&self, request: &SubscriptionRequest) -> Result<String, PipelineError> {
        let url = request.url.as_str();
        tracing::debug!(url = %url, kind = %request.kind, stage = %Stage::Start, "Rewriting subscription");

        let body = self
            .fetcher
            .fetch(url)
            .await
            .map_err(PipelineError::Subscription)?;
        trace_stage(url, Stage::Fetched);

        let mut document = fetch::resolve_body(url, &body).map_err(PipelineError::Subscription)?;
        trace_stage(url, Stage::Decoded);

        let removed = editor::remove_nameserver(&mut document, &self.edits.dns_to_remove);
        tracing::debug!(url = %url, removed, stage = %Stage::DnsEdited, "Stage complete");

        let updated = editor::set_proxy_group_url(&mut document, &self.edits.group_url);
        tracing::debug!(url = %url, updated, stage = %Stage::UrlEdited, "Stage complete");

        self.append_rules(&mut document).await?;
        trace_stage(url, Stage::RulesEdited);

        editor::apply_node_edits(
            self.node_editor.as_ref(),
            &mut document,
            request.kind,
            &request.payload,
        )?;
        trace_stage(url, Stage::NodesEdited);

        let encoded = encode(&document, request.format)?;
        trace_stage(url, Stage::Encoded);

        tracing::info!(url = %url, format = ?request.format, bytes = encoded.len(), stage = %Stage::Done, "Subscription rewritten");
        Ok(encoded)
    }

    async fn append_rules(&self, document: &mut Document) -> Result<(), PipelineError> {
        let rules_url = self.edits.rules_url.as_str();
        match editor::append_remote_rule(document, &self.fetcher, rules_url).await {
            Ok(()) => Ok(()),
            Err(editor::EditError::RemoteRules(e)) if self.edits.remote_rules_optional => {
                tracing::warn!(rules_url = %rules_url, error = %e, "Remote rules unavailable, continuing without them");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn encode(document: &Document, format: OutputFormat) -> Result<String, PipelineError> {
    let text = document.dump().map_err(PipelineError::Encode)?;
    Ok(match format {
        OutputFormat::Yaml => text,
        OutputFormat::Base64 => codec::encode(&text),
    })
}

fn trace_stage(url: &str, stage: Stage) {
    tracing::debug!(url = %url, stage = %stage, "Stage complete");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_formats() {
        let doc = Document::parse("port: 7890\n").unwrap();

        let yaml = encode(&doc, OutputFormat::Yaml).unwrap();
        assert_eq!(Document::parse(&yaml).unwrap(), doc);

        let wrapped = encode(&doc, OutputFormat::Base64).unwrap();
        assert!(codec::is_encoded(&wrapped));
        assert_eq!(codec::decode(&wrapped).unwrap(), yaml);
    }

    #[tokio::test]
    async fn test_unreachable_subscription_is_reported_once() {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let pipeline = Pipeline::new(SubscriptionFetcher::with_client(client), EditConfig::default());
        let response = pipeline
            .process_subscription(SubscriptionRequest::new("http://127.0.0.1:9/sub.yaml"))
            .await;

        match response {
            SubscriptionResponse::Failure { error } => {
                assert!(error.starts_with("Failed to decode subscription: request to http://127.0.0.1:9/sub.yaml failed"));
            }
            SubscriptionResponse::Success { .. } => panic!("expected failure"),
        }
    }

    struct Marker;

    impl NodeEditor for Marker {}

    #[test]
    fn test_rebuild_keeps_node_editor() {
        let editor: Arc<dyn NodeEditor> = Arc::new(Marker);
        let pipeline = Pipeline::new(SubscriptionFetcher::with_client(reqwest::Client::new()), EditConfig::default())
            .with_node_editor(editor.clone());

        let mut config = RewriterConfig::default();
        config.edits.dns_to_remove = "8.8.8.8".into();
        let rebuilt = pipeline.rebuild(&config).unwrap();

        assert_eq!(rebuilt.edits().dns_to_remove, "8.8.8.8");
        assert!(Arc::ptr_eq(&rebuilt.node_editor, &editor));
    }
}
