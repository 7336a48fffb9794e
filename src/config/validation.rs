//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid and distinct)
//! - Check the backend URL and identity header are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("backend.base_url '{0}' is not an http(s) URL")]
    BackendUrl(String),

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("listener.port must not be 0")]
    MissingPort,

    #[error("listener.http_port {0} collides with listener.port")]
    PortCollision(u16),

    #[error("listener.tls.{field} must not be empty")]
    EmptyTlsPath { field: &'static str },

    #[error("listener.tls.min_version '{0}' is not one of \"1.2\", \"1.3\"")]
    TlsVersion(String),

    #[error("admin_users entry '{0}' is not an email address")]
    AdminEmail(String),

    #[error("session.identity_header '{0}' is not a valid header name")]
    IdentityHeader(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.backend.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base() => {}
        _ => errors.push(ValidationError::BackendUrl(config.backend.base_url.clone())),
    }

    let listener = &config.listener;
    if listener.port == 0 {
        errors.push(ValidationError::MissingPort);
    }
    if listener.http_port != 0 && listener.http_port == listener.port {
        errors.push(ValidationError::PortCollision(listener.http_port));
    }

    for (field, value) in [
        ("listener.read_timeout_secs", listener.read_timeout_secs),
        ("listener.write_timeout_secs", listener.write_timeout_secs),
        ("listener.redirect_write_timeout_secs", listener.redirect_write_timeout_secs),
        ("backend.timeout_secs", config.backend.timeout_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroValue { field });
        }
    }
    if listener.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue { field: "listener.max_body_bytes" });
    }

    if let Some(tls) = &listener.tls {
        if tls.cert_path.trim().is_empty() {
            errors.push(ValidationError::EmptyTlsPath { field: "cert_path" });
        }
        if tls.key_path.trim().is_empty() {
            errors.push(ValidationError::EmptyTlsPath { field: "key_path" });
        }
        if !matches!(tls.min_version.as_str(), "1.2" | "1.3") {
            errors.push(ValidationError::TlsVersion(tls.min_version.clone()));
        }
    }

    for admin in &config.admin_users {
        if admin.trim().is_empty() || !admin.contains('@') {
            errors.push(ValidationError::AdminEmail(admin.clone()));
        }
    }

    if HeaderName::from_bytes(config.session.identity_header.as_bytes()).is_err() {
        errors.push(ValidationError::IdentityHeader(
            config.session.identity_header.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TlsConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GatewayConfig::default();
        config.backend.base_url = "ftp://backend".into();
        config.backend.timeout_secs = 0;
        config.listener.http_port = config.listener.port;
        config.admin_users = vec!["not-an-email".into()];
        config.listener.tls = Some(TlsConfig {
            cert_path: String::new(),
            key_path: "key.pem".into(),
            min_version: "1.0".into(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::BackendUrl("ftp://backend".into())));
        assert!(errors.contains(&ValidationError::ZeroValue { field: "backend.timeout_secs" }));
        assert!(errors.contains(&ValidationError::PortCollision(9000)));
        assert!(errors.contains(&ValidationError::AdminEmail("not-an-email".into())));
        assert!(errors.contains(&ValidationError::EmptyTlsPath { field: "cert_path" }));
        assert!(errors.contains(&ValidationError::TlsVersion("1.0".into())));
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn test_rejects_bad_identity_header() {
        let mut config = GatewayConfig::default();
        config.session.identity_header = "x forwarded".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::IdentityHeader("x forwarded".into())]);
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
