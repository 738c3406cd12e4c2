//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the rewriter.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the subscription rewriter.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RewriterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Edit parameters applied to every subscription.
    pub edits: EditConfig,

    /// Upstream fetch settings.
    pub fetch: FetchConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Field-level edits applied by the pipeline.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct EditConfig {
    /// Nameserver removed from `dns.nameserver`.
    pub dns_to_remove: String,

    /// Health-check URL written to every proxy group that has one.
    pub group_url: String,

    /// Remote rule-set referenced by the appended `RULE-SET` rule.
    pub rules_url: String,

    /// Continue without the rule-set reference when it cannot be fetched.
    /// When false, a rule-set fetch failure fails the request.
    pub remote_rules_optional: bool,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            dns_to_remove: "223.5.5.5".to_string(),
            group_url: "https://api.v2fly.org/checkConnection.svgz".to_string(),
            rules_url: "https://raw.githubusercontent.com/yzcjd/proxy-rules/main/clash.cool.ini"
                .to_string(),
            remote_rules_optional: true,
        }
    }
}

/// HTTP client settings for subscription and rule-set fetches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// User-Agent sent upstream. Providers pick the payload format from it.
    pub user_agent: String,

    /// Overall request timeout in seconds. Unset means the client default.
    pub timeout_secs: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("subscription-rewriter/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: None,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for one inbound request, upstream fetches included.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024, // 64KB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_carry_fixed_edit_parameters() {
        let config = RewriterConfig::default();
        assert_eq!(config.edits.dns_to_remove, "223.5.5.5");
        assert_eq!(config.edits.group_url, "https://api.v2fly.org/checkConnection.svgz");
        assert!(config.edits.rules_url.ends_with("/clash.cool.ini"));
        assert!(config.edits.remote_rules_optional);
        assert!(config.fetch.timeout_secs.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: RewriterConfig = toml::from_str(
            r#"
            [edits]
            dns_to_remove = "114.114.114.114"

            [fetch]
            timeout_secs = 15
            "#,
        )
        .unwrap();

        assert_eq!(config.edits.dns_to_remove, "114.114.114.114");
        assert_eq!(config.edits.group_url, EditConfig::default().group_url);
        assert_eq!(config.fetch.timeout_secs, Some(15));
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.timeouts.request_secs, 30);
    }
}
