//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files, and
//! every section defaults to the compiled-in deployment values so an empty
//! file (or no file at all) yields a working gateway.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Decoy prefix table.
    pub domains: DomainsConfig,

    /// Fixed redirects and HTTPS enforcement.
    pub redirect: RedirectConfig,

    /// Upstream client settings.
    pub upstream: UpstreamConfig,

    /// Response header policy.
    pub response: ResponseConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration. When present the listener terminates TLS
    /// and inbound requests are considered secure.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// One row of the domain table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DomainMappingConfig {
    /// Upstream hostname, e.g. `api.github.com`.
    pub real_domain: String,

    /// Leading label(s) of the decoy hostname, e.g. `api-github-com.`.
    pub decoy_prefix: String,
}

impl DomainMappingConfig {
    pub fn new(real_domain: impl Into<String>, decoy_prefix: impl Into<String>) -> Self {
        Self {
            real_domain: real_domain.into(),
            decoy_prefix: decoy_prefix.into(),
        }
    }
}

/// Domain table configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DomainsConfig {
    /// Prefix checked before the table scan. Root-relative links are only
    /// rewritten for responses served under this prefix.
    pub shortcut_prefix: String,

    /// Ordered mapping table. Earlier entries win ties.
    pub mappings: Vec<DomainMappingConfig>,
}

impl Default for DomainsConfig {
    fn default() -> Self {
        Self {
            shortcut_prefix: "gh.".to_string(),
            mappings: default_mappings(),
        }
    }
}

fn default_mappings() -> Vec<DomainMappingConfig> {
    [
        ("github.com", "gh."),
        ("avatars.githubusercontent.com", "avatars-githubusercontent-com."),
        ("github.githubassets.com", "github-githubassets-com."),
        ("collector.github.com", "collector-github-com."),
        ("api.github.com", "api-github-com."),
        ("raw.githubusercontent.com", "raw-githubusercontent-com."),
        ("gist.githubusercontent.com", "gist-githubusercontent-com."),
        ("github.io", "github-io."),
        ("assets-cdn.github.com", "assets-cdn-github-com."),
        ("cdn.jsdelivr.net", "cdn.jsdelivr-net."),
        ("securitylab.github.com", "securitylab-github-com."),
        ("www.githubstatus.com", "www-githubstatus-com."),
        ("npmjs.com", "npmjs-com."),
        ("git-lfs.github.com", "git-lfs-github-com."),
        ("githubusercontent.com", "githubusercontent-com."),
        ("github.global.ssl.fastly.net", "github-global-ssl-fastly-net."),
        ("api.npms.io", "api-npms-io."),
        ("github.community", "github-community."),
    ]
    .into_iter()
    .map(|(real, decoy)| DomainMappingConfig::new(real, decoy))
    .collect()
}

/// Redirect configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Absolute URL the fixed paths redirect to.
    pub target: String,

    /// Exact paths answered with a 302 to `target`, on every host.
    pub paths: Vec<String>,

    /// Redirect plain-HTTP requests to their HTTPS equivalent.
    pub enforce_https: bool,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            target: "https://www.987632.xyz".to_string(),
            paths: ["/", "/login", "/signup", "/copilot"]
                .into_iter()
                .map(String::from)
                .collect(),
            enforce_https: true,
        }
    }
}

/// Upstream client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total upstream request timeout (including body) in seconds.
    pub request_timeout_secs: u64,

    /// Maximum inbound request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Response header policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// `max-age` of the public cache directive, in seconds.
    pub cache_max_age_secs: u64,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            cache_max_age_secs: 14_400,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable Prometheus metrics exporter.
    pub metrics_enabled: bool,

    /// Metrics listener address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "decoy_gateway=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
