//! HTTP client for subscription and rule-set retrieval.
//!
//! # Responsibilities
//! - Issue one GET per call with the configured User-Agent
//! - Treat any non-2xx status as a network failure
//! - Pick the decoding path for a fetched subscription

use std::time::Duration;

use reqwest::Client;

use crate::codec;
use crate::config::FetchConfig;
use crate::document::Document;
use crate::fetch::types::FetchError;
use crate::observability::metrics;

/// Fetches subscription documents over HTTP(S).
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct SubscriptionFetcher {
    client: Client,
    /// Settings the client was built from. `None` for a caller-supplied client.
    config: Option<FetchConfig>,
}

impl SubscriptionFetcher {
    /// Build a fetcher from configuration.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(FetchError::Client)?;
        Ok(Self {
            client,
            config: Some(config.clone()),
        })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            config: None,
        }
    }

    /// Fetcher for `config`, reusing this one when the settings are unchanged.
    ///
    /// A caller-supplied client is always kept.
    pub fn reconfigure(&self, config: &FetchConfig) -> Result<Self, FetchError> {
        match &self.config {
            Some(current) if current != config => Self::new(config),
            _ => Ok(self.clone()),
        }
    }

    /// Retrieve the body at `url` as text.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url = %url, "Fetching");

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(source) if source.is_builder() => {
                metrics::record_fetch("invalid_url");
                return Err(FetchError::InvalidUrl {
                    url: url.to_string(),
                    source,
                });
            }
            Err(source) => {
                metrics::record_fetch("network_error");
                return Err(FetchError::Network {
                    url: url.to_string(),
                    source,
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            metrics::record_fetch("bad_status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| {
            metrics::record_fetch("network_error");
            FetchError::Network {
                url: url.to_string(),
                source,
            }
        })?;

        metrics::record_fetch("ok");
        tracing::debug!(url = %url, bytes = body.len(), "Fetched");
        Ok(body)
    }

    /// Fetch `url` and turn the body into a document.
    pub async fn resolve_document(&self, url: &str) -> Result<Document, FetchError> {
        let body = self.fetch(url).await?;
        resolve_body(url, &body)
    }
}

/// Turn a body fetched from `url` into a document.
///
/// A `.yaml`/`.yml` path is parsed as is; otherwise the body must look
/// base64-encoded.
pub fn resolve_body(url: &str, body: &str) -> Result<Document, FetchError> {
    if has_markup_extension(url) {
        return Ok(Document::parse(body)?);
    }

    if codec::is_encoded(body) {
        let text = codec::decode(body)?;
        return Ok(Document::parse(&text)?);
    }

    Err(FetchError::UnsupportedFormat {
        url: url.to_string(),
    })
}

/// Returns true if the URL path ends in `.yaml` or `.yml`.
///
/// Query strings and fragments are ignored. Unparseable URLs fall back to a
/// plain suffix check.
pub fn has_markup_extension(url: &str) -> bool {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_ascii_lowercase(),
        Err(_) => url.to_ascii_lowercase(),
    };
    path.ends_with(".yaml") || path.ends_with(".yml")
}
