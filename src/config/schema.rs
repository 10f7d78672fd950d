//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.
//! Keys are kebab-case so JSON files written for earlier deployments
//! (`proxy-host`, `regex-find-replace`, ...) load unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the rewriting proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProxyConfig {
    /// Upstream host requests are forwarded to (e.g., "backend.internal:8080").
    pub proxy_host: String,

    /// Find-and-replace rules applied to upstream response bodies.
    pub regex_find_replace: RewriteRules,

    /// Listen address (e.g., ":8080" or "127.0.0.1:8080").
    pub port: String,

    /// URL path prefix served from `static_dir_root` (e.g., "/public").
    pub static_dir_url_root: String,

    /// Local directory holding static content.
    pub static_dir_root: String,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ProxyConfig {
    /// Socket address to bind, expanding the ":8080" shorthand to all interfaces.
    pub fn listen_address(&self) -> String {
        if self.port.starts_with(':') {
            format!("0.0.0.0{}", self.port)
        } else {
            self.port.clone()
        }
    }
}

/// A single find-and-replace pair as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RewriteRule {
    /// Regular expression to search for.
    pub find: String,

    /// Replacement template; `$1` and `${name}` expand capture groups.
    pub replace: String,
}

impl RewriteRule {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }
}

/// Rewrite rules in either of the two accepted shapes.
///
/// The list form is applied exactly in the order written. The mapping form
/// has no order of its own, so its entries are applied sorted by pattern.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RewriteRules {
    Ordered(Vec<RewriteRule>),
    Mapping(BTreeMap<String, String>),
}

impl Default for RewriteRules {
    fn default() -> Self {
        RewriteRules::Ordered(Vec::new())
    }
}

impl RewriteRules {
    /// Rules in application order.
    pub fn to_ordered(&self) -> Vec<RewriteRule> {
        match self {
            RewriteRules::Ordered(rules) => rules.clone(),
            RewriteRules::Mapping(map) => map
                .iter()
                .map(|(find, replace)| RewriteRule::new(find.as_str(), replace.as_str()))
                .collect(),
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, RewriteRules::Mapping(map) if !map.is_empty())
    }

    pub fn len(&self) -> usize {
        match self {
            RewriteRules::Ordered(rules) => rules.len(),
            RewriteRules::Mapping(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<RewriteRule>> for RewriteRules {
    fn from(rules: Vec<RewriteRule>) -> Self {
        RewriteRules::Ordered(rules)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
