//! Redirect resolution for denied matches.
//!
//! # Responsibilities
//! - Substitute `{route}` with the encoded original request target
//! - Invoke `func://` redirect functions instead of redirecting
//! - Localize plain destinations before they are emitted
//!
//! # Design Decisions
//! - Encoding follows form encoding (spaces become `+`)
//! - A `func://` target that does not resolve is an error, not a 404

use serde_json::Value;
use url::form_urlencoded;

use crate::dispatch::filter::substitute;
use crate::error::DispatchError;
use crate::handler::{CallableCheck, HandlerRegistry};
use crate::routing::params::Params;
use crate::routing::router::Router;
use crate::routing::target::{CallSpec, RedirectSpec, ROUTE_PLACEHOLDER};

pub const DEFAULT_REDIRECT_STATUS: u16 = 302;

/// Where a redirect ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum Redirect {
    /// Emit a redirect response.
    Location { location: String, status: u16 },
    /// A redirect function ran instead; this is its result.
    Invoked(Value),
}

/// Form-encodes `original` for embedding in a destination.
pub fn encode_route(original: &str) -> String {
    form_urlencoded::byte_serialize(original.as_bytes()).collect()
}

/// Resolves `spec` for a request whose raw target was `original`.
pub fn resolve_redirect(
    spec: &RedirectSpec,
    original: &str,
    params: &Params,
    router: &Router,
    registry: &HandlerRegistry,
) -> Result<Redirect, DispatchError> {
    let encoded = encode_route(original);
    match spec {
        RedirectSpec::Location(template) => {
            let destination = template.replace(ROUTE_PLACEHOLDER, &encoded);
            let location = router.localize(&destination, None);
            tracing::debug!(%location, "Redirect resolved");
            Ok(Redirect::Location {
                location,
                status: DEFAULT_REDIRECT_STATUS,
            })
        }
        RedirectSpec::Function(call) => {
            let call = CallSpec::parse(&call.replace(ROUTE_PLACEHOLDER, &encoded));
            registry
                .ensure_callable(&call.target)
                .map_err(|_| DispatchError::InvalidMethod {
                    target: call.target.to_string(),
                })?;
            let args = substitute(call.args.as_deref(), params);
            tracing::debug!(function = %call.target, "Redirect function invoked");
            Ok(Redirect::Invoked(registry.invoke(&call.target, &args)?))
        }
    }
}
