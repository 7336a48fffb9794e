//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! GatewayConfig.listener
//!     → listener.rs (mode selection, bind, header read timeout)
//!     → tls.rs (rustls server config: pinned versions, AEAD-only suites)
//!     → primary listener serves the API router
//!     → redirect.rs (optional plaintext listener: 301 + HSTS, nothing else)
//! ```
//!
//! # Design Decisions
//! - Direct TLS and reverse-proxy modes are mutually exclusive
//! - The redirect listener only runs alongside direct TLS

pub mod listener;
pub mod redirect;
pub mod tls;

pub use listener::{serve, ListenerError, ListenerMode};
