//! Session gate: turns a request's session into authorization facts.
//!
//! # Data Flow
//! ```text
//! request headers
//!     → SessionProvider (logged in? who?)
//!     → GET settings from the backend (fresh every request, never cached)
//!     → Access::evaluate (admin list, domain whitelist, user whitelist)
//!     → Authorization handed to the route handler
//! ```
//!
//! Anonymous requests skip the settings fetch entirely.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::error::{GatewayError, Rejection};
use crate::http::server::AppState;
use crate::session::Session;
use crate::upstream::types::Settings;
use crate::upstream::{endpoint, Resource};

/// What a caller may do. `is_admin` implies `is_allowed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Access {
    pub is_allowed: bool,
    pub is_admin: bool,
}

impl Access {
    pub const DENIED: Self = Self {
        is_allowed: false,
        is_admin: false,
    };

    /// Decide access for an authenticated email.
    ///
    /// Domain entries match as a literal, case-sensitive `@domain` suffix;
    /// user entries match the whole email exactly.
    pub fn evaluate(email: &str, admins: &[String], settings: &Settings) -> Self {
        if admins.iter().any(|admin| admin == email) {
            return Self {
                is_allowed: true,
                is_admin: true,
            };
        }

        let domain_match = settings
            .whitelisted_domains
            .iter()
            .any(|domain| email.ends_with(&format!("@{domain}")));
        let user_match = settings.whitelisted_users.iter().any(|user| user == email);

        Self {
            is_allowed: domain_match || user_match,
            is_admin: false,
        }
    }
}

/// Role an operation demands beyond being logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    LoggedIn,
    Allowed,
    /// Admin rights, denied with the given operation-specific rejection.
    Admin(Rejection),
}

/// Outcome of the gate for one request.
#[derive(Debug, Clone)]
pub struct Authorization {
    pub session: Session,
    /// Zero-valued when the session is anonymous.
    pub settings: Settings,
    pub access: Access,
}

impl Authorization {
    pub fn email(&self) -> &str {
        self.session.email()
    }

    pub fn is_admin(&self) -> bool {
        self.access.is_admin
    }

    /// Check a requirement, logging any denial with the caller's identity.
    pub fn permits(&self, requirement: Requirement) -> Result<(), Rejection> {
        if !self.session.is_logged_in() {
            return Err(Rejection::AuthRequired);
        }
        match requirement {
            Requirement::LoggedIn => Ok(()),
            Requirement::Allowed if self.access.is_allowed => Ok(()),
            Requirement::Allowed => {
                tracing::warn!(actor = %self.email(), "Denied: caller is not whitelisted");
                Err(Rejection::AuthRequired)
            }
            Requirement::Admin(_) if self.access.is_admin => Ok(()),
            Requirement::Admin(denial) => {
                tracing::warn!(
                    actor = %self.email(),
                    ?denial,
                    "Denied: administrator rights required"
                );
                Err(denial)
            }
        }
    }
}

/// Run the gate for a request.
pub async fn authorize(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Authorization, GatewayError> {
    let session = state.sessions.session(headers);
    if !session.is_logged_in() {
        return Ok(Authorization {
            session,
            settings: Settings::default(),
            access: Access::DENIED,
        });
    }

    let settings: Settings = state
        .upstream
        .get(Resource::collection(endpoint::SETTINGS))
        .await?
        .expect_success()?;

    let access = Access::evaluate(session.email(), &state.config.admin_users, &settings);

    tracing::debug!(
        actor = %session.email(),
        is_allowed = access.is_allowed,
        is_admin = access.is_admin,
        "Session authorized"
    );

    Ok(Authorization {
        session,
        settings,
        access,
    })
}

impl FromRequestParts<AppState> for Authorization {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(state, &parts.headers).await
    }
}
