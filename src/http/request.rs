//! Request-side helpers.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID for every inbound request
//! - Extract optional trailing path segments (email, fingerprint)
//! - Decode JSON bodies into the client-data rejection on failure

use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue, Request};
use serde::de::DeserializeOwned;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::response::Rejection;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Issues a fresh UUID v4 for requests that arrive without an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// The single `{segment}` captured by a route, or `""` when the route had none
/// (e.g. `/api/certs/` with nothing after the slash).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment(pub String);

impl Segment {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S> FromRequestParts<S> for Segment
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let segment = Path::<String>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| value)
            .unwrap_or_default();
        Ok(Self(segment))
    }
}

/// Decode a JSON request body. Anything malformed is the caller's fault.
pub fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, Rejection> {
    serde_json::from_slice(body).map_err(|err| {
        tracing::debug!(error = %err, "Rejecting malformed request body");
        Rejection::ClientJson
    })
}
