//! Session resolution.
//!
//! The gateway does not authenticate anyone itself. A [`SessionProvider`]
//! turns an inbound request into a [`Session`]; handlers only ever read it.
//!
//! The shipped provider, [`HeaderSessionProvider`], trusts an identity header
//! injected by the authenticating proxy in front of the gateway.

use axum::http::header::InvalidHeaderName;
use axum::http::{HeaderMap, HeaderName};

use crate::config::SessionConfig;

/// Identity bound to a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    email: Option<String>,
}

impl Session {
    /// A session with no authenticated identity.
    pub fn anonymous() -> Self {
        Self { email: None }
    }

    /// A session authenticated as `email`.
    pub fn logged_in(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.email.is_some()
    }

    /// Authenticated email, or `""` when not logged in.
    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }
}

/// Capability: given a request, return its session.
pub trait SessionProvider: Send + Sync {
    fn session(&self, headers: &HeaderMap) -> Session;
}

/// Reads the authenticated email from a trusted request header.
#[derive(Debug, Clone)]
pub struct HeaderSessionProvider {
    header: HeaderName,
}

impl HeaderSessionProvider {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }

    pub fn from_config(config: &SessionConfig) -> Result<Self, InvalidHeaderName> {
        let header = HeaderName::from_bytes(config.identity_header.as_bytes())?;
        Ok(Self::new(header))
    }
}

impl SessionProvider for HeaderSessionProvider {
    fn session(&self, headers: &HeaderMap) -> Session {
        headers
            .get(&self.header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map_or_else(Session::anonymous, Session::logged_in)
    }
}
