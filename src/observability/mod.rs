//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router compilation and every dispatch produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Metrics are cheap (facade calls are no-ops without a recorder)

pub mod logging;
pub mod metrics;
