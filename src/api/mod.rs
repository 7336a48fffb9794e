//! Route handlers, one module per client resource.
//!
//! # Data Flow
//! ```text
//! request
//!     → Authorization extractor (gate: session + fresh settings)
//!     → permits(requirement)          403 on failure, logged
//!     → handler-specific backend calls, strictly sequential
//!     → envelope (artifact) | Rejection (4xx) | GatewayError (opaque 500)
//! ```
//!
//! Handlers hold no state between requests. Every state-mutating success is
//! logged at info with the acting identity and the target.
//!
//! State-changing handlers run their backend sequence through
//! [`run_to_completion`]: once started, it finishes (and is logged) even if
//! the client disconnects or the request deadline passes.

use std::future::Future;

use crate::error::{GatewayError, HandlerResult};

pub mod certs;
pub mod config;
pub mod events;
pub mod init;
pub mod totp;
pub mod types;
pub mod users;
pub mod whitelist;

/// Drive `operation` on its own task and wait for it.
pub async fn run_to_completion<F>(operation: F) -> HandlerResult
where
    F: Future<Output = HandlerResult> + Send + 'static,
{
    tokio::spawn(operation).await.map_err(GatewayError::from)?
}
