//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. Keys are
//! kebab-case (`socks-port`, `allow-lan`).

use serde::{Deserialize, Serialize};

/// Root configuration for the inbound service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProxyConfig {
    /// Front-end ports and exposure.
    pub inbound: InboundConfig,

    /// Per-listener resource limits.
    pub limits: LimitsConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Admin API.
    pub admin: AdminConfig,
}

/// Front-end bind settings. A port of 0 turns that front-end off.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct InboundConfig {
    /// HTTP proxy port.
    pub port: u16,

    /// SOCKS port, shared by the TCP listener and the UDP relay.
    pub socks_port: u16,

    /// Transparent-redirect port.
    pub redir_port: u16,

    /// Allow connections from other hosts. When false every front-end binds
    /// loopback and `bind_address` is ignored.
    pub allow_lan: bool,

    /// Host to bind when `allow_lan` is set; `"all"` binds every interface.
    pub bind_address: String,
}

impl Default for InboundConfig {
    fn default() -> Self {
        Self {
            port: 7890,
            socks_port: 7891,
            redir_port: 0,
            allow_lan: false,
            bind_address: "all".to_string(),
        }
    }
}

/// Limits applied to every TCP front-end.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct LimitsConfig {
    /// Maximum concurrent connections per listener (backpressure).
    pub max_connections: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_connections: 10_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct AdminConfig {
    /// Serve the admin API.
    pub enabled: bool,

    /// Bearer token; empty disables authentication.
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            bind_address: "127.0.0.1:9097".to_string(),
        }
    }
}
