//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, text or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging with actor/target fields on every audit line
//! - Request ID flows through the trace layer into every span
//! - Metrics recording is a no-op until the exporter is installed

pub mod logging;
pub mod metrics;
