//! Upstream bridge to the certificate-management backend.
//!
//! # Data Flow
//! ```text
//! handler
//!     → client.rs (URL join, one request, JSON decode)
//!     → Reply<T> { status, body }
//!     → caller classifies: expect_success / success_or_absent
//! ```
//!
//! # Design Decisions
//! - Single attempt, no retry; a bounded timeout covers the whole call
//! - Transport and decode failures are errors; HTTP statuses are not
//! - 404 is only recoverable where the caller says so

pub mod client;
pub mod types;

pub use client::{Reply, Resource, UpstreamClient, UpstreamError};
pub use types::endpoint;
