//! Plaintext listener that only upgrades clients to HTTPS.
//!
//! Every request, whatever its method or path, gets a `301` to the HTTPS
//! equivalent with `Connection: close`. Outside debug deployments the
//! response also carries `Strict-Transport-Security`.

use std::time::Duration;

use axum::extract::State;
use axum::http::header::{CONNECTION, HOST, LOCATION, STRICT_TRANSPORT_SECURITY};
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

pub const HSTS_POLICY: &str = "max-age=31536000; includeSubDomains";

const DEFAULT_HTTPS_PORT: u16 = 443;

/// Host without its port. Bracketed IPv6 literals keep their brackets.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    host.split_once(':').map_or(host, |(name, _)| name)
}

/// HTTPS URL equivalent to a plaintext request.
///
/// The port suffix is the primary TLS port, omitted when it is 443.
pub fn https_url(host: &str, tls_port: u16, path_and_query: &str) -> String {
    let host = strip_port(host);
    let path_and_query = if path_and_query.is_empty() { "/" } else { path_and_query };
    if tls_port == DEFAULT_HTTPS_PORT {
        format!("https://{host}{path_and_query}")
    } else {
        format!("https://{host}:{tls_port}{path_and_query}")
    }
}

async fn upgrade(State(tls_port): State<u16>, headers: HeaderMap, uri: Uri) -> Response {
    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| uri.authority().map(|authority| authority.as_str()))
        .filter(|host| !host.is_empty());
    let Some(host) = host else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());
    let target = https_url(host, tls_port, path_and_query);

    match HeaderValue::from_str(&target) {
        Ok(location) => (StatusCode::MOVED_PERMANENTLY, [(LOCATION, location)]).into_response(),
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

/// Router of the redirect-only listener.
#[allow(deprecated)]
pub fn redirect_router(tls_port: u16, debug: bool, write_timeout: Duration) -> Router {
    let mut router = Router::new()
        .fallback(upgrade)
        .with_state(tls_port)
        .layer(SetResponseHeaderLayer::overriding(
            CONNECTION,
            HeaderValue::from_static("close"),
        ));

    if !debug {
        router = router.layer(SetResponseHeaderLayer::overriding(
            STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS_POLICY),
        ));
    }

    router.layer(TimeoutLayer::new(write_timeout))
}
