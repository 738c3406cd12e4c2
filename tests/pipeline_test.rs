//! End-to-end pipeline tests against a mock subscription provider.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_yaml::Value;
use subscription_rewriter::codec;
use subscription_rewriter::document::Document;
use subscription_rewriter::editor::{EditError, NodeEditor};
use subscription_rewriter::pipeline::OutputFormat;
use subscription_rewriter::{SubscriptionRequest, SubscriptionResponse};

mod common;

const SUBSCRIPTION: &str = r#"
port: 7890
dns:
  enable: true
  nameserver: ["223.5.5.5", "8.8.8.8"]
proxies:
  - { name: n1, type: ss, server: 1.2.3.4, port: 443, cipher: aes-128-gcm, password: pw }
proxy-groups:
  - { name: auto, type: url-test, proxies: [n1], url: "http://www.gstatic.com/generate_204", interval: 300 }
  - { name: select, type: select, proxies: [auto, n1] }
rules:
  - MATCH,auto
"#;

async fn start_provider() -> SocketAddr {
    common::start_mock_backend(vec![
        ("/sub.yaml", 200, SUBSCRIPTION.to_string()),
        ("/api/v1/subscribe", 200, codec::encode(SUBSCRIPTION)),
        ("/plain", 200, "hello: world\n".to_string()),
        ("/list", 200, codec::encode("- a\n- b\n")),
        ("/bad-rules.yaml", 200, "rules: MATCH,DIRECT\n".to_string()),
        ("/broken", 500, "boom".to_string()),
        ("/rules.ini", 200, "DOMAIN-SUFFIX,example.com\n".to_string()),
    ])
    .await
}

fn expect_document(response: SubscriptionResponse) -> Document {
    match response {
        SubscriptionResponse::Success { url } => {
            assert!(!url.is_empty());
            Document::parse(&url).unwrap()
        }
        SubscriptionResponse::Failure { error } => panic!("unexpected failure: {}", error),
    }
}

fn expect_error(response: SubscriptionResponse) -> String {
    match response {
        SubscriptionResponse::Failure { error } => error,
        SubscriptionResponse::Success { url } => panic!("unexpected success: {}", url),
    }
}

fn strings<'a>(value: Option<&'a Value>) -> Vec<&'a str> {
    value
        .and_then(Value::as_sequence)
        .map(|seq| seq.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_full_rewrite_of_yaml_subscription() {
    let addr = start_provider().await;
    let pipeline = common::test_pipeline(common::test_edits(addr));

    let response = pipeline
        .process_subscription(SubscriptionRequest::new(format!("http://{}/sub.yaml", addr)))
        .await;
    let doc = expect_document(response);

    assert_eq!(
        strings(doc.get("dns").and_then(|dns| dns.get("nameserver"))),
        vec!["8.8.8.8"]
    );

    let groups = doc.get("proxy-groups").and_then(Value::as_sequence).unwrap();
    assert_eq!(
        groups[0].get("url").and_then(Value::as_str),
        Some("https://api.v2fly.org/checkConnection.svgz")
    );
    assert!(groups[1].get("url").is_none());

    let rules = strings(doc.get("rules"));
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0], "MATCH,auto");
    assert_eq!(rules[1], format!("RULE-SET: http://{}/rules.ini, DIRECT", addr));

    // Untouched fields survive.
    assert_eq!(doc.get("port").and_then(Value::as_u64), Some(7890));
    assert_eq!(doc.get("proxies").and_then(Value::as_sequence).map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_base64_subscription_is_decoded() {
    let addr = start_provider().await;
    let pipeline = common::test_pipeline(common::test_edits(addr));

    let response = pipeline
        .process_subscription(SubscriptionRequest::new(format!("http://{}/api/v1/subscribe", addr)))
        .await;
    let doc = expect_document(response);

    assert_eq!(
        strings(doc.get("dns").and_then(|dns| dns.get("nameserver"))),
        vec!["8.8.8.8"]
    );
    assert_eq!(strings(doc.get("rules")).len(), 2);
}

#[tokio::test]
async fn test_base64_output_format() {
    let addr = start_provider().await;
    let pipeline = common::test_pipeline(common::test_edits(addr));

    let mut request = SubscriptionRequest::new(format!("http://{}/sub.yaml", addr));
    request.format = OutputFormat::Base64;

    let encoded = match pipeline.process_subscription(request).await {
        SubscriptionResponse::Success { url } => url,
        SubscriptionResponse::Failure { error } => panic!("unexpected failure: {}", error),
    };
    assert!(codec::is_encoded(&encoded));

    let doc = Document::parse(&codec::decode(&encoded).unwrap()).unwrap();
    assert_eq!(strings(doc.get("rules")).len(), 2);
}

#[tokio::test]
async fn test_upstream_error_status() {
    let addr = start_provider().await;
    let pipeline = common::test_pipeline(common::test_edits(addr));

    let error = expect_error(
        pipeline
            .process_subscription(SubscriptionRequest::new(format!("http://{}/broken", addr)))
            .await,
    );
    assert!(error.starts_with("Failed to decode subscription: "), "{}", error);
    assert!(error.contains("500"), "{}", error);
}

#[tokio::test]
async fn test_unrecognised_formats() {
    let addr = start_provider().await;
    let pipeline = common::test_pipeline(common::test_edits(addr));

    let error = expect_error(
        pipeline
            .process_subscription(SubscriptionRequest::new(format!("http://{}/plain", addr)))
            .await,
    );
    assert!(error.starts_with("Failed to decode subscription: unsupported subscription format"), "{}", error);

    let error = expect_error(
        pipeline
            .process_subscription(SubscriptionRequest::new(format!("http://{}/list", addr)))
            .await,
    );
    assert!(error.starts_with("Failed to decode subscription: expected a mapping"), "{}", error);
}

#[tokio::test]
async fn test_strict_remote_rules_failure_is_fatal() {
    let addr = start_provider().await;
    let mut edits = common::test_edits(addr);
    edits.rules_url = format!("http://{}/missing.ini", addr);
    edits.remote_rules_optional = false;
    let pipeline = common::test_pipeline(edits);

    let error = expect_error(
        pipeline
            .process_subscription(SubscriptionRequest::new(format!("http://{}/sub.yaml", addr)))
            .await,
    );
    assert!(error.starts_with("Failed to fetch remote rules: "), "{}", error);
    assert!(error.contains("404"), "{}", error);
}

#[tokio::test]
async fn test_remote_rules_failure_skips_the_rule_by_default() {
    let addr = start_provider().await;
    let mut edits = common::test_edits(addr);
    edits.rules_url = format!("http://{}/missing.ini", addr);
    assert!(edits.remote_rules_optional);
    let pipeline = common::test_pipeline(edits);

    let doc = expect_document(
        pipeline
            .process_subscription(SubscriptionRequest::new(format!("http://{}/sub.yaml", addr)))
            .await,
    );
    assert_eq!(strings(doc.get("rules")), vec!["MATCH,auto"]);
    assert_eq!(
        strings(doc.get("dns").and_then(|dns| dns.get("nameserver"))),
        vec!["8.8.8.8"]
    );
}

#[tokio::test]
async fn test_malformed_rules_field() {
    let addr = start_provider().await;
    let pipeline = common::test_pipeline(common::test_edits(addr));

    let error = expect_error(
        pipeline
            .process_subscription(SubscriptionRequest::new(format!("http://{}/bad-rules.yaml", addr)))
            .await,
    );
    assert_eq!(error, "Failed to process subscription: field `rules` must be a sequence");
}

#[derive(Default)]
struct CountingEditor {
    adds: AtomicUsize,
    removes: AtomicUsize,
}

impl NodeEditor for CountingEditor {
    fn add_nodes(&self, document: &mut Document, payload: &serde_json::Value) -> Result<(), EditError> {
        self.adds.fetch_add(1, Ordering::SeqCst);
        let name = payload["name"]
            .as_str()
            .ok_or_else(|| EditError::Nodes("missing node name".into()))?;
        document.insert("x-added", Value::from(name));
        Ok(())
    }

    fn remove_nodes(&self, _: &mut Document, _: &serde_json::Value) -> Result<(), EditError> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_node_editor_hook() {
    let addr = start_provider().await;
    let editor = Arc::new(CountingEditor::default());
    let pipeline = common::test_pipeline(common::test_edits(addr)).with_node_editor(editor.clone());
    let url = format!("http://{}/sub.yaml", addr);

    let add: SubscriptionRequest = serde_json::from_value(serde_json::json!({
        "url": url, "type": "add", "payload": { "name": "n2" }
    }))
    .unwrap();
    let doc = expect_document(pipeline.process_subscription(add).await);
    assert_eq!(doc.get("x-added").and_then(Value::as_str), Some("n2"));

    let other: SubscriptionRequest = serde_json::from_value(serde_json::json!({
        "url": url, "type": "update", "payload": null
    }))
    .unwrap();
    let doc = expect_document(pipeline.process_subscription(other).await);
    assert!(doc.get("x-added").is_none());

    let remove: SubscriptionRequest = serde_json::from_value(serde_json::json!({
        "url": url, "type": "remove"
    }))
    .unwrap();
    expect_document(pipeline.process_subscription(remove).await);

    let bad: SubscriptionRequest = serde_json::from_value(serde_json::json!({
        "url": url, "type": "add", "payload": {}
    }))
    .unwrap();
    let error = expect_error(pipeline.process_subscription(bad).await);
    assert_eq!(error, "Failed to process subscription: node edit rejected: missing node name");

    assert_eq!(editor.adds.load(Ordering::SeqCst), 2);
    assert_eq!(editor.removes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_invocations_are_independent() {
    let addr = start_provider().await;
    let pipeline = common::test_pipeline(common::test_edits(addr));

    let yaml = SubscriptionRequest::new(format!("http://{}/sub.yaml", addr));
    let encoded = SubscriptionRequest::new(format!("http://{}/api/v1/subscribe", addr));
    let broken = SubscriptionRequest::new(format!("http://{}/broken", addr));

    let (a, b, c) = tokio::join!(
        pipeline.process_subscription(yaml),
        pipeline.process_subscription(encoded),
        pipeline.process_subscription(broken),
    );

    assert_eq!(strings(expect_document(a).get("rules")).len(), 2);
    assert_eq!(strings(expect_document(b).get("rules")).len(), 2);
    assert!(!c.is_success());
}
