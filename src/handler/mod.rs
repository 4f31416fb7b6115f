//! Handler-registry subsystem.
//!
//! # Data Flow
//! ```text
//! "Controller#method" / "function"
//!     → registry.rs (lookup, case-insensitive)
//!     → autoload.rs (late registration, if allowed and not yet known)
//!     → HandlerFn(&Args) → serde_json::Value
//! ```
//!
//! # Design Decisions
//! - Handlers return `serde_json::Value`; filters are read through `truthy`
//! - The matcher only needs `CallableCheck`, never invocation

pub mod args;
pub mod autoload;
pub mod registry;

pub use args::{truthy, Args};
pub use autoload::{AutoloadPaths, ControllerLoader, PluginTable};
pub use registry::{AssumeCallable, CallableCheck, Controller, HandlerFn, HandlerRegistry};
