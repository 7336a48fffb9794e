//! Shutdown coordination for the listeners.

use std::time::Duration;

use axum_server::Handle;

/// Drain deadline for in-flight requests once shutdown starts.
pub const GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Coordinator for graceful shutdown.
///
/// Holds one server handle per listener; triggering stops both from
/// accepting and gives open connections the grace period to finish.
#[derive(Clone)]
pub struct Shutdown {
    primary: Handle,
    redirect: Handle,
    grace: Duration,
}

impl Shutdown {
    pub fn new(grace: Duration) -> Self {
        Self {
            primary: Handle::new(),
            redirect: Handle::new(),
            grace,
        }
    }

    pub fn primary(&self) -> Handle {
        self.primary.clone()
    }

    pub fn redirect(&self) -> Handle {
        self.redirect.clone()
    }

    /// Begin graceful shutdown of every listener.
    pub fn trigger(&self) {
        tracing::info!(
            grace_secs = self.grace.as_secs(),
            connections = self.connection_count(),
            "Graceful shutdown started"
        );
        self.primary.graceful_shutdown(Some(self.grace));
        self.redirect.graceful_shutdown(Some(self.grace));
    }

    /// Open connections on the primary listener.
    pub fn connection_count(&self) -> usize {
        self.primary.connection_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new(GRACE_PERIOD)
    }
}
