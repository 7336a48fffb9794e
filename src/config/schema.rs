//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Debug deployment: verbose logs, no HSTS on the redirect listener.
    pub debug: bool,

    /// Emails granted administrator rights. Deployment-level, never held by the backend.
    pub admin_users: Vec<String>,

    /// Optional directory of static client assets served for non-API paths.
    pub static_content: Option<PathBuf>,

    /// Listener configuration (ports, TLS, timeouts).
    pub listener: ListenerConfig,

    /// Certificate-management backend the gateway proxies to.
    pub backend: BackendConfig,

    /// Session resolution settings.
    pub session: SessionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl GatewayConfig {
    /// Whether `email` is one of the configured administrators.
    pub fn is_admin(&self, email: &str) -> bool {
        self.admin_users.iter().any(|admin| admin == email)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address without port (e.g., "0.0.0.0").
    pub bind_address: String,

    /// Primary port (TLS in direct mode, plain HTTP behind a reverse proxy).
    pub port: u16,

    /// Plaintext port for the HSTS redirect listener; 0 disables it.
    pub http_port: u16,

    /// Optional TLS configuration. Absent means reverse-proxy mode.
    pub tls: Option<TlsConfig>,

    /// Time allowed for a client to send request headers, including while a
    /// kept-alive connection waits for its next request.
    pub read_timeout_secs: u64,

    /// Time allowed to produce a response.
    pub write_timeout_secs: u64,

    /// Response deadline on the redirect-only listener.
    pub redirect_write_timeout_secs: u64,

    /// Maximum accepted request body size.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 9000,
            http_port: 0,
            tls: None,
            read_timeout_secs: 5,
            write_timeout_secs: 10,
            redirect_write_timeout_secs: 5,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// TLS configuration for the primary listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate chain file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,

    /// Minimum protocol version, "1.2" or "1.3".
    #[serde(default = "default_min_version")]
    pub min_version: String,
}

fn default_min_version() -> String {
    "1.2".to_string()
}

/// Backend service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL every backend path is joined onto.
    pub base_url: String,

    /// Bound on a single backend call, connect through body.
    pub timeout_secs: u64,

    /// Extra trust root for the backend's TLS certificate (PEM).
    pub ca_cert_path: Option<String>,

    /// Skip backend certificate verification. Development only.
    pub accept_invalid_certs: bool,

    /// Honor HTTP(S)_PROXY environment variables for backend calls.
    pub system_proxy: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:9090/".to_string(),
            timeout_secs: 10,
            ca_cert_path: None,
            accept_invalid_certs: false,
            system_proxy: true,
        }
    }
}

/// Session resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Header carrying the authenticated email, set by the fronting auth proxy.
    pub identity_header: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            identity_header: "x-forwarded-email".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}
