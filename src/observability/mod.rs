//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay and transport produce:
//!     → logging.rs (structured log events, stderr)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → Terminal or log aggregation
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
