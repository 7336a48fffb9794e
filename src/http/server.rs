//! HTTP application setup.
//!
//! # Responsibilities
//! - Hold the shared, read-only application state
//! - Declare every API route with its closed set of methods (others get 405)
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Optionally serve static client assets for non-API paths

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, put};
use axum::Router;
use tower::util::MapRequestLayer;
use tower::ServiceBuilder;
use tower_http::body::Limited;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::api::{certs, config, events, init, totp, users, whitelist};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::observability::metrics;
use crate::session::SessionProvider;
use crate::upstream::UpstreamClient;

/// Application state injected into handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub upstream: UpstreamClient,
    pub sessions: Arc<dyn SessionProvider>,
}

impl AppState {
    pub fn new(
        config: Arc<GatewayConfig>,
        upstream: UpstreamClient,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            config,
            upstream,
            sessions,
        }
    }
}

/// Build the gateway router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    let listener = &state.config.listener;
    let write_timeout = Duration::from_secs(listener.write_timeout_secs);
    let max_body_bytes = listener.max_body_bytes;
    let static_content = state.config.static_content.clone();

    let mut router = api_routes().with_state(state);

    if let Some(dir) = static_content {
        tracing::info!(path = %dir.display(), "Serving static content");
        let index = ServeFile::new(dir.join("index.html"));
        router = router.fallback_service(ServeDir::new(dir).not_found_service(index));
    }

    let layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &http::Request<Body>| {
            let request_id = request
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id,
            )
        }))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(MapRequestLayer::new(|request: http::Request<Limited<Body>>| {
            request.map(Body::new)
        }))
        .layer(middleware::from_fn_with_state(write_timeout, enforce_deadline));

    router.layer(layers).layer(middleware::from_fn(track_metrics))
}

/// Route table. Each resource lists exactly the methods it supports.
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/init", get(init::show))
        .route("/api/config", get(config::show).put(config::update))
        .route("/api/whitelist", get(whitelist::list))
        .route("/api/whitelist/", put(whitelist::add).delete(whitelist::remove))
        .route("/api/whitelist/{email}", put(whitelist::add).delete(whitelist::remove))
        .route("/api/users", get(users::list))
        .route("/api/users/", get(users::show).delete(users::remove))
        .route("/api/users/{email}", get(users::show).delete(users::remove))
        .route("/api/certs", get(certs::list).post(certs::create))
        .route("/api/certs/", delete(certs::revoke))
        .route("/api/certs/{fingerprint}", delete(certs::revoke))
        .route("/api/totp", get(totp::status).post(totp::enroll))
        .route("/api/events", get(events::list))
}

/// Answer with the opaque 500 envelope once `deadline` passes.
///
/// Mutating handlers run on their own task (see [`crate::api::run_to_completion`]),
/// so dropping the handler future here never cuts a backend sequence short.
async fn enforce_deadline(
    State(deadline): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    match tokio::time::timeout(deadline, next.run(request)).await {
        Ok(response) => response,
        Err(_) => GatewayError::Deadline(deadline).into_response(),
    }
}

async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let response = next.run(request).await;
    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}
