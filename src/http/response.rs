//! Response envelope and rejection catalog.
//!
//! Every JSON endpoint answers with the same shape:
//!
//! ```text
//! { "Error": { "Message": "", "Extra": "", "Recoverable": false }, "Artifact": { ... } }
//! ```
//!
//! `Error` is absent on success; `Artifact` carries the endpoint's data.
//! User-visible failure messages come only from [`Rejection`], so the same
//! condition reads the same on every endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// User-facing error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorBody {
    pub message: String,
    pub extra: String,
    pub recoverable: bool,
}

impl ErrorBody {
    fn new(message: &str, extra: &str, recoverable: bool) -> Self {
        Self {
            message: message.to_string(),
            extra: extra.to_string(),
            recoverable,
        }
    }

    /// Body of every fatal response. Carries no detail about the cause.
    pub fn internal() -> Self {
        Self::new("Internal server error.", "", false)
    }
}

/// The `{Error?, Artifact?}` wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<T>,
}

/// Serialize an envelope with the given status.
pub fn send<T: Serialize>(status: StatusCode, body: ApiResponse<T>) -> Response {
    (status, Json(body)).into_response()
}

/// 200 with an artifact.
pub fn ok<T: Serialize>(artifact: T) -> Response {
    send(
        StatusCode::OK,
        ApiResponse {
            error: None,
            artifact: Some(artifact),
        },
    )
}

/// Error-only envelope.
pub fn failure(status: StatusCode, error: ErrorBody) -> Response {
    send::<()>(
        status,
        ApiResponse {
            error: Some(error),
            artifact: None,
        },
    )
}

/// Closed catalog of locally handled failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No authenticated session (or not whitelisted for user-level resources).
    AuthRequired,
    /// Request body is not the JSON the endpoint expects.
    ClientJson,
    /// Required path segment (email, fingerprint) is missing.
    ClientUrl,
    /// Non-admin asked for a certificate on someone else's behalf.
    CertOwnerMismatch,
    SettingsAdminRequired,
    UsersAdminRequired,
    EventsAdminRequired,
    /// Fingerprint unknown to the backend or already revoked.
    CertNotFound,
}

impl Rejection {
    pub fn status(self) -> StatusCode {
        match self {
            Self::ClientJson | Self::ClientUrl => StatusCode::BAD_REQUEST,
            Self::CertNotFound => StatusCode::NOT_FOUND,
            Self::AuthRequired
            | Self::CertOwnerMismatch
            | Self::SettingsAdminRequired
            | Self::UsersAdminRequired
            | Self::EventsAdminRequired => StatusCode::FORBIDDEN,
        }
    }

    pub fn body(self) -> ErrorBody {
        const RELOAD: &str = "Please reload the page.";
        const CLIENT_DATA: &str = "There was an error in data your client sent.";
        match self {
            Self::AuthRequired => {
                ErrorBody::new("You must be logged in to use this application.", RELOAD, false)
            }
            Self::ClientJson | Self::ClientUrl => ErrorBody::new(CLIENT_DATA, RELOAD, true),
            Self::CertOwnerMismatch => ErrorBody::new(CLIENT_DATA, RELOAD, false),
            Self::SettingsAdminRequired => {
                ErrorBody::new("You must be an administrator to access settings.", "", false)
            }
            Self::UsersAdminRequired => {
                ErrorBody::new("You must be an administrator to manage users.", "", false)
            }
            Self::EventsAdminRequired => {
                ErrorBody::new("You must be an administrator to view events.", "", false)
            }
            Self::CertNotFound => ErrorBody::new(
                "That certificate does not exist or has already been revoked.",
                RELOAD,
                true,
            ),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        failure(self.status(), self.body())
    }
}
