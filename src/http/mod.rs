//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection (net)
//!     → server.rs (router, middleware: request ID, trace, timeout, body limit)
//!     → request.rs (path segments, JSON bodies)
//!     → api handler (gate + upstream calls)
//!     → response.rs (envelope, rejection catalog)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{parse_json, Segment, UuidRequestId, X_REQUEST_ID};
pub use response::{ApiResponse, ErrorBody, Rejection};
pub use server::{build_router, AppState};
