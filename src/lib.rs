//! Authenticated API gateway for a certificate-management backend.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌───────────────────────────────────────────────────────┐
//!                       │                        GATEWAY                        │
//!                       │                                                       │
//!   Client Request      │  ┌─────────┐    ┌─────────┐    ┌───────────────┐      │
//!   ────────────────────┼─▶│   net   │───▶│  http   │───▶│  api handler  │      │
//!                       │  │listener │    │ router  │    └──────┬────────┘      │
//!                       │  └─────────┘    └─────────┘           │               │
//!   (plain HTTP)        │  ┌─────────┐                          ▼               │
//!   ────────────────────┼─▶│redirect │ 301 + HSTS       ┌───────────────┐       │
//!                       │  └─────────┘                  │ gate: session │       │
//!                       │                               │ + settings    │       │
//!                       │                               └──────┬────────┘       │
//!                       │                                      ▼                │
//!   Client Response     │  ┌──────────┐                 ┌───────────────┐       │
//!   ◀───────────────────┼──│ envelope │◀────────────────│   upstream    │◀──────┼──── Backend
//!                       │  └──────────┘                 └───────────────┘       │
//!                       │                                                       │
//!                       │  config · observability · lifecycle · session         │
//!                       └───────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod session;
pub mod upstream;

pub use config::GatewayConfig;
pub use error::{GatewayError, HandlerError, Rejection};
pub use http::{build_router, AppState};
pub use lifecycle::Shutdown;
