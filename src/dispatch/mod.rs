//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! raw target + method
//!     → routing (match)
//!     → filter.rs (guard, params substituted)
//!     → registry invoke           (allowed)
//!     → redirect.rs               (denied, redirect declared)
//!     → errors.rs 401             (denied, no redirect)
//!     → default route / static renderer / errors.rs 404 (unmatched)
//! ```
//!
//! # Design Decisions
//! - Outcomes are values; the transport decides how to emit them
//! - The static renderer is the terminal fallback for unmatched routes

pub mod dispatcher;
pub mod errors;
pub mod filter;
pub mod redirect;

pub use dispatcher::{Dispatched, Dispatcher, Outcome};
pub use errors::ErrorHandlers;
pub use redirect::{Redirect, DEFAULT_REDIRECT_STATUS};
