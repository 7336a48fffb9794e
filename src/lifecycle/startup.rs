//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order (metrics, backend client, sessions)
//! - Build the router and hand it to the listeners
//! - Wire OS signals to graceful shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)
//! - A listener that stops without a shutdown signal ends the process with an error

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::InvalidHeaderName;
use metrics_exporter_prometheus::BuildError;
use thiserror::Error;

use crate::config::GatewayConfig;
use crate::http::server::{build_router, AppState};
use crate::lifecycle::{signals, Shutdown};
use crate::net::{self, ListenerError};
use crate::observability::metrics;
use crate::session::HeaderSessionProvider;
use crate::upstream::{UpstreamClient, UpstreamError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("invalid session identity header: {0}")]
    IdentityHeader(#[from] InvalidHeaderName),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// Construct the shared request-handling state.
pub fn build_state(config: Arc<GatewayConfig>) -> Result<AppState, StartupError> {
    let upstream = UpstreamClient::new(&config.backend)?;
    let sessions = HeaderSessionProvider::from_config(&config.session)?;

    if config.admin_users.is_empty() {
        tracing::warn!("No administrators configured; settings and users cannot be managed");
    }

    Ok(AppState::new(config, upstream, Arc::new(sessions)))
}

/// Run the gateway until shutdown.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    let config = Arc::new(config);

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| {
                StartupError::MetricsAddress(config.observability.metrics_address.clone())
            })?;
        metrics::init_metrics(addr)?;
    }

    let state = build_state(config.clone())?;
    let app = build_router(state);

    let shutdown = Shutdown::default();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_requested().await;
        on_signal.trigger();
    });

    net::serve(&config, app, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
