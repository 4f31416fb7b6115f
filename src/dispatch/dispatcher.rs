//! Request dispatch.
//!
//! # Responsibilities
//! - Match the request, run the filter, invoke the target
//! - Redirect or deny when the filter refuses
//! - Fall back to the default route, then to the static renderer
//! - Route not-found / forbidden conditions to the error handlers
//!
//! # Design Decisions
//! - Everything per-request lives in the returned `Dispatched`; the
//!   dispatcher itself is never mutated and can be shared across threads
//! - Handler and filter failures are returned as-is

use serde::Serialize;
use serde_json::Value;

use crate::config::DispatchConfig;
use crate::dispatch::errors::ErrorHandlers;
use crate::dispatch::filter::run_filter;
use crate::dispatch::redirect::{resolve_redirect, Redirect};
use crate::error::{DispatchError, RouteError};
use crate::handler::{Args, CallableCheck, HandlerRegistry};
use crate::observability::metrics;
use crate::routing::matcher::{MatchResult, Walk};
use crate::routing::path::{tokenize, SEPARATOR};
use crate::routing::router::Router;
use crate::routing::target::{CallSpec, HandlerRef, TargetRecord};

pub const STATUS_OK: u16 = 200;
pub const STATUS_UNAUTHORIZED: u16 = 401;
pub const STATUS_NOT_FOUND: u16 = 404;

/// What a dispatch produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The matched target (or a redirect function) ran.
    Invoked { value: Value },
    /// The static renderer handled an unmatched route.
    Rendered { value: Value },
    /// The caller should redirect.
    Redirected { location: String, status: u16 },
    /// An error handler produced the body.
    Failed { status: u16, body: Value },
}

impl Outcome {
    pub fn status(&self) -> u16 {
        match self {
            Outcome::Invoked { .. } | Outcome::Rendered { .. } => STATUS_OK,
            Outcome::Redirected { status, .. } | Outcome::Failed { status, .. } => *status,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Invoked { .. } => "invoked",
            Outcome::Rendered { .. } => "rendered",
            Outcome::Redirected { .. } => "redirected",
            Outcome::Failed { .. } => "failed",
        }
    }
}

/// A finished dispatch and what was resolved along the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dispatched {
    pub outcome: Outcome,
    /// The walk result; absent when the walk was aborted.
    pub matched: Option<MatchResult>,
    /// The target that was invoked, if any.
    pub handler: Option<HandlerRef>,
}

impl Dispatched {
    fn new(outcome: Outcome, matched: Option<MatchResult>) -> Self {
        Self {
            outcome,
            matched,
            handler: None,
        }
    }

    /// The resolved route trail; `clean` drops parameter markers.
    pub fn route(&self, clean: bool) -> String {
        self.matched
            .as_ref()
            .map(|m| m.route(clean))
            .unwrap_or_default()
    }

    pub fn status(&self) -> u16 {
        self.outcome.status()
    }
}

/// Orchestrates match → filter → invoke-or-redirect → fallbacks.
#[derive(Debug)]
pub struct Dispatcher {
    router: Router,
    registry: HandlerRegistry,
    errors: ErrorHandlers,
}

impl Dispatcher {
    /// Compiles `config` against `registry`.
    ///
    /// Error handlers must resolve, like the default filter. The
    /// `autoprocess` setting does not dispatch anything here; the caller runs
    /// the initial request through [`Dispatcher::autoprocess`].
    pub fn new(config: &DispatchConfig, registry: HandlerRegistry) -> Result<Self, RouteError> {
        let router = Router::build(config, &registry)?;
        let errors = ErrorHandlers::from_config(&config.handlers);
        errors.ensure_callable(&registry)?;
        Ok(Self {
            router,
            registry,
            errors,
        })
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Dispatches the initial request when `autoprocess` is configured.
    ///
    /// Stands in for a dispatch at construction time: `new` never runs one,
    /// so the embedding application calls this once it has the request.
    pub fn autoprocess(
        &self,
        target: &str,
        method: &str,
    ) -> Option<Result<Dispatched, DispatchError>> {
        if !self.router.config().autoprocess {
            return None;
        }
        tracing::info!(request = target, method, "Autoprocessing initial request");
        Some(self.dispatch(target, method))
    }

    /// Dispatches a raw request target (path plus optional query).
    pub fn dispatch(&self, target: &str, method: &str) -> Result<Dispatched, DispatchError> {
        let dispatched = self.dispatch_inner(target, method, true)?;
        metrics::record_dispatch(dispatched.outcome.kind(), dispatched.status());
        tracing::debug!(
            request = target,
            method,
            route = %dispatched.route(false),
            outcome = dispatched.outcome.kind(),
            status = dispatched.status(),
            "Dispatched"
        );
        Ok(dispatched)
    }

    fn dispatch_inner(
        &self,
        target: &str,
        method: &str,
        allow_default_route: bool,
    ) -> Result<Dispatched, DispatchError> {
        let result = match self.router.match_request(target, method, &self.registry) {
            Walk::Complete(result) => result,
            Walk::Forbidden { prefix, path } => {
                tracing::warn!(%prefix, %path, "Forbidden prefix in request");
                let message = format!("Forbidden prefix '{}' in route {}.", prefix, path);
                return self.fail(STATUS_NOT_FOUND, &message, None);
            }
        };

        if let Some(record) = result.target.clone() {
            return self.run_target(target, record, result);
        }

        if allow_default_route && result.path == SEPARATOR.to_string() {
            if let Some(default) = self.router.config().default_route() {
                if !tokenize(default).is_empty() {
                    let retry = format!("{}{}{}", self.router.root(), SEPARATOR, default);
                    tracing::debug!(route = %retry, "Dispatching default route");
                    return self.dispatch_inner(&retry, method, false);
                }
            }
        }

        let key = result.path.clone();
        self.render_static(&key, Some(result))
    }

    fn run_target(
        &self,
        original: &str,
        record: TargetRecord,
        result: MatchResult,
    ) -> Result<Dispatched, DispatchError> {
        let mut allowed = !record.handler.is_empty();
        if allowed {
            if let Some(filter) = &record.filter {
                allowed = run_filter(&self.registry, filter, &result.params)?;
            }
        }

        if allowed {
            if !self.registry.is_callable(&record.handler) {
                tracing::debug!(handler = %record.handler, "Target not callable, trying static");
                let key = result.path.clone();
                return self.render_static(&key, Some(result));
            }
            let value = self
                .registry
                .invoke(&record.handler, &Args::Params(result.params.clone()))?;
            return Ok(Dispatched {
                outcome: Outcome::Invoked { value },
                matched: Some(result),
                handler: Some(record.handler),
            });
        }

        if let Some(redirect) = &record.redirect {
            let outcome = match resolve_redirect(
                redirect,
                original,
                &result.params,
                &self.router,
                &self.registry,
            )? {
                Redirect::Location { location, status } => Outcome::Redirected { location, status },
                Redirect::Invoked(value) => Outcome::Invoked { value },
            };
            return Ok(Dispatched::new(outcome, Some(result)));
        }

        tracing::warn!(route = %result.route(false), "Request denied by filter");
        self.fail(STATUS_UNAUTHORIZED, "Forbidden", Some(result))
    }

    /// Hands an unmatched route to the static renderer.
    fn render_static(
        &self,
        key: &str,
        matched: Option<MatchResult>,
    ) -> Result<Dispatched, DispatchError> {
        if let Some(renderer) = self.router.config().static_renderer() {
            let spec = CallSpec::parse(renderer);
            if self.registry.is_callable(&spec.target) {
                let mut args: Vec<Option<String>> = spec
                    .args
                    .iter()
                    .flatten()
                    .map(|arg| Some(arg.to_string()))
                    .collect();
                args.push(Some(key.to_string()));
                let value = self.registry.invoke(&spec.target, &Args::List(args))?;
                return Ok(Dispatched::new(Outcome::Rendered { value }, matched));
            }
            tracing::debug!(renderer, "Static renderer not callable");
        }
        self.fail(STATUS_NOT_FOUND, "Template not found", matched)
    }

    fn fail(
        &self,
        status: u16,
        message: &str,
        matched: Option<MatchResult>,
    ) -> Result<Dispatched, DispatchError> {
        let body = self.errors.handle(&self.registry, status, Some(message))?;
        Ok(Dispatched::new(Outcome::Failed { status, body }, matched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;
    use serde_json::json;

    fn dispatcher(routes: Vec<RouteConfig>) -> Dispatcher {
        let config = DispatchConfig {
            routes,
            ..DispatchConfig::default()
        };
        let registry = HandlerRegistry::new()
            .function("hello", |_| Ok(json!("hello")))
            .function("deny", |_| Ok(json!(false)));
        Dispatcher::new(&config, registry).unwrap()
    }

    #[test]
    fn test_invokes_target() {
        let d = dispatcher(vec![RouteConfig::new("/hi", "hello")]);
        let out = d.dispatch("/hi", "GET").unwrap();
        assert_eq!(out.outcome, Outcome::Invoked { value: json!("hello") });
        assert_eq!(out.handler, Some(HandlerRef::Function("hello".into())));
        assert_eq!(out.route(false), "hi");
    }

    #[test]
    fn test_denied_without_redirect_is_401() {
        let d = dispatcher(vec![RouteConfig::new("/hi", "hello").filter("deny")]);
        let out = d.dispatch("/hi", "GET").unwrap();
        assert_eq!(
            out.outcome,
            Outcome::Failed {
                status: 401,
                body: json!("401 - Forbidden")
            }
        );
        assert_eq!(out.handler, None);
    }

    #[test]
    fn test_uncallable_target_falls_to_static() {
        let d = dispatcher(vec![RouteConfig::new("/ghost", "nobody")]);
        let out = d.dispatch("/ghost", "GET").unwrap();
        assert_eq!(
            out.outcome,
            Outcome::Failed {
                status: 404,
                body: json!("404 - Template not found")
            }
        );
        assert_eq!(out.route(false), "ghost");
    }

    #[test]
    fn test_autoprocess_requires_flag() {
        let d = dispatcher(vec![RouteConfig::new("/hi", "hello")]);
        assert!(d.autoprocess("/hi", "GET").is_none());
    }

    #[test]
    fn test_outcome_serializes_with_kind() {
        let outcome = Outcome::Redirected {
            location: "/login".into(),
            status: 302,
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({ "kind": "redirected", "location": "/login", "status": 302 })
        );
    }
}
