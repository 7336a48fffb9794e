//! Listener bootstrap.
//!
//! # Responsibilities
//! - Pick the mode: direct TLS when a certificate is configured, plaintext
//!   behind a reverse proxy otherwise
//! - Start the primary listener and, in TLS mode, the optional redirect listener
//! - Apply the header read timeout to every connection
//!
//! # Design Decisions
//! - A listener that fails is never restarted; the error ends the process
//! - Both listeners stop together on graceful shutdown

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use axum::Router;
use axum_server::{Handle, Server};
use hyper_util::rt::TokioTimer;
use thiserror::Error;

use crate::config::{GatewayConfig, ListenerConfig};
use crate::lifecycle::Shutdown;
use crate::net::redirect::redirect_router;
use crate::net::tls::{load_tls_config, TlsError};

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("invalid bind address '{0}'")]
    Address(String),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("{listener} listener failed: {source}")]
    Serve {
        listener: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// How the primary listener reaches clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerMode {
    /// Terminates TLS itself; may run the redirect listener.
    DirectTls,
    /// Plain HTTP; a front-end proxy supplies TLS.
    ReverseProxy,
}

impl ListenerMode {
    pub fn from_config(config: &ListenerConfig) -> Self {
        if config.tls.is_some() {
            Self::DirectTls
        } else {
            Self::ReverseProxy
        }
    }
}

fn socket_addr(config: &ListenerConfig, port: u16) -> Result<SocketAddr, ListenerError> {
    let ip: IpAddr = config
        .bind_address
        .parse()
        .map_err(|_| ListenerError::Address(config.bind_address.clone()))?;
    Ok(SocketAddr::new(ip, port))
}

fn serve_failed(listener: &'static str) -> impl FnOnce(std::io::Error) -> ListenerError {
    move |source| ListenerError::Serve { listener, source }
}

fn tuned<A>(mut server: Server<A>, handle: Handle, read_timeout: Duration) -> Server<A> {
    server
        .http_builder()
        .http1()
        .timer(TokioTimer::new())
        .header_read_timeout(read_timeout);
    server.handle(handle)
}

/// Run the listeners until graceful shutdown completes or one of them fails.
pub async fn serve(
    config: &GatewayConfig,
    app: Router,
    shutdown: &Shutdown,
) -> Result<(), ListenerError> {
    let listener = &config.listener;
    let mode = ListenerMode::from_config(listener);
    let addr = socket_addr(listener, listener.port)?;
    let read_timeout = Duration::from_secs(listener.read_timeout_secs);

    match (mode, &listener.tls) {
        (ListenerMode::DirectTls, Some(tls)) => {
            let rustls = load_tls_config(tls)?;
            tracing::info!(address = %addr, "Primary listener starting (direct TLS)");
            let primary = tuned(
                axum_server::bind_rustls(addr, rustls),
                shutdown.primary(),
                read_timeout,
            )
            .serve(app.into_make_service());

            if listener.http_port == 0 {
                return primary.await.map_err(serve_failed("primary"));
            }

            let redirect_addr = socket_addr(listener, listener.http_port)?;
            let redirect_app = redirect_router(
                listener.port,
                config.debug,
                Duration::from_secs(listener.redirect_write_timeout_secs),
            );
            tracing::info!(address = %redirect_addr, "Redirect listener starting");
            let redirect = tuned(
                axum_server::bind(redirect_addr),
                shutdown.redirect(),
                read_timeout,
            )
            .serve(redirect_app.into_make_service());

            tokio::try_join!(
                async { primary.await.map_err(serve_failed("primary")) },
                async { redirect.await.map_err(serve_failed("redirect")) },
            )?;
            Ok(())
        }
        _ => {
            if listener.http_port != 0 {
                tracing::warn!(
                    http_port = listener.http_port,
                    "http_port ignored: no TLS certificate configured"
                );
            }
            tracing::info!(address = %addr, "Primary listener starting (reverse-proxy mode)");
            tuned(axum_server::bind(addr), shutdown.primary(), read_timeout)
                .serve(app.into_make_service())
                .await
                .map_err(serve_failed("primary"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TlsConfig;

    #[test]
    fn test_mode_follows_tls_presence() {
        let mut config = ListenerConfig::default();
        assert_eq!(ListenerMode::from_config(&config), ListenerMode::ReverseProxy);

        config.tls = Some(TlsConfig {
            cert_path: "cert.pem".into(),
            key_path: "key.pem".into(),
            min_version: "1.2".into(),
        });
        assert_eq!(ListenerMode::from_config(&config), ListenerMode::DirectTls);
    }

    #[test]
    fn test_bad_bind_address() {
        let config = ListenerConfig {
            bind_address: "not-an-ip".into(),
            ..Default::default()
        };
        assert!(matches!(socket_addr(&config, 80), Err(ListenerError::Address(_))));
    }

    #[tokio::test]
    async fn test_missing_certificate_fails_before_serving() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "127.0.0.1".into();
        config.listener.tls = Some(TlsConfig {
            cert_path: "/nonexistent/cert.pem".into(),
            key_path: "/nonexistent/key.pem".into(),
            min_version: "1.2".into(),
        });

        let err = serve(&config, Router::new(), &Shutdown::default()).await.unwrap_err();
        assert!(matches!(err, ListenerError::Tls(_)));
    }

    #[tokio::test]
    async fn test_port_in_use_is_fatal() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "127.0.0.1".into();
        config.listener.port = taken.local_addr().unwrap().port();

        let err = serve(&config, Router::new(), &Shutdown::default()).await.unwrap_err();
        assert!(matches!(err, ListenerError::Serve { listener: "primary", .. }));
    }
}
