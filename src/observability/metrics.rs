//! Dispatch metrics.
//!
//! # Metrics
//! - `router_dispatch_total` (counter): dispatches by outcome and status
//! - `router_compiled_routes` (gauge): declarations in the compiled tree
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; installing an exporter is up to
//!   the embedding application

/// Records one finished dispatch.
pub fn record_dispatch(outcome: &'static str, status: u16) {
    metrics::counter!(
        "router_dispatch_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
}

/// Records the size of a freshly compiled tree.
pub fn record_compiled_routes(count: usize) {
    metrics::gauge!("router_compiled_routes").set(count as f64);
}
