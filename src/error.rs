//! Request-level failure types.
//!
//! Handlers distinguish two kinds of failure:
//! - [`Rejection`]: the caller did something wrong (bad input, missing role).
//!   Rendered locally through the envelope with a 4xx status.
//! - [`GatewayError`]: the backend misbehaved or was unreachable. Always fatal
//!   for the request; converted into an opaque 500 with no internal detail.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response::{self, ErrorBody};
pub use crate::http::response::Rejection;
use crate::upstream::UpstreamError;

/// Unexpected upstream condition. Never retried, never shown to the client.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("unexpected status {status} from backend endpoint '{endpoint}'")]
    UnexpectedStatus {
        endpoint: &'static str,
        status: StatusCode,
    },

    #[error("backend invariant violated: {0}")]
    InvariantViolated(String),

    #[error("malformed backend timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("request exceeded its {0:?} deadline")]
    Deadline(Duration),

    #[error("request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request aborted by upstream failure");
        response::failure(StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
    }
}

/// Outcome of a route handler that did not produce an artifact.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("request rejected: {0:?}")]
    Rejected(Rejection),

    #[error(transparent)]
    Fatal(#[from] GatewayError),
}

impl From<Rejection> for HandlerError {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl From<UpstreamError> for HandlerError {
    fn from(err: UpstreamError) -> Self {
        Self::Fatal(GatewayError::Upstream(err))
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            Self::Rejected(rejection) => rejection.into_response(),
            Self::Fatal(err) => err.into_response(),
        }
    }
}

/// Result type of every API route handler.
pub type HandlerResult = Result<Response, HandlerError>;
