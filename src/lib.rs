//! Tree-based request router and dispatcher.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod http;
pub mod locale;
pub mod observability;
pub mod routing;

pub use config::schema::DispatchConfig;
pub use dispatch::{Dispatched, Dispatcher, Outcome};
pub use error::{DispatchError, HandlerError, RouteError};
pub use handler::{Args, Controller, HandlerRegistry};
pub use routing::{Params, Router};
