//! HTTP adapter.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum fallback, tracing layer)
//!     → Dispatcher::dispatch (on the blocking pool)
//!     → response.rs (Outcome → status, Location, body)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - Every path goes through a single fallback; the route tree, not Axum,
//!   decides what runs
//! - Handlers are synchronous, so dispatch runs under `spawn_blocking`

pub mod response;
pub mod server;

pub use response::outcome_response;
pub use server::{app, serve};
