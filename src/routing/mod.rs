//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (target, method)
//!     → path.rs (drop query, strip root, tokenize)
//!     → matcher.rs (forbidden prefix, de-localize, walk tree / conventions)
//!     → Return: MatchResult or Walk::Forbidden
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → target.rs (parse handler / filter / redirect references)
//!     → tree.rs (segment prefix tree, parameter conflicts)
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex: a parameter captures exactly one segment
//! - Deterministic: same input always matches same route
//! - Literal segments beat parameter captures at the same depth

pub mod matcher;
pub mod method;
pub mod params;
pub mod path;
pub mod router;
pub mod target;
pub mod tree;

pub use matcher::{MatchResult, Matcher, Resolution, Walk};
pub use method::Method;
pub use params::Params;
pub use router::Router;
pub use target::{Arg, CallSpec, FilterSpec, HandlerRef, RedirectSpec, TargetRecord};
pub use tree::RouteTree;
