//! Route lookup.
//!
//! # Responsibilities
//! - Compile configuration into an immutable router
//! - Strip the root and query from request targets before matching
//! - Expose localization in both directions
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Handler validity is checked through `CallableCheck`, never by invoking
//! - Explicit `Walk::Forbidden` / unmatched results rather than silent defaults

use crate::config::{DispatchConfig, RouterConfig};
use crate::error::RouteError;
use crate::handler::CallableCheck;
use crate::locale::Localizer;
use crate::observability::metrics;
use crate::routing::matcher::{Matcher, Walk};
use crate::routing::params::Params;
use crate::routing::path::{request_path, strip_root, tokenize};
use crate::routing::target::HandlerRef;
use crate::routing::tree::{Defaults, RouteTree};

/// A compiled router.
#[derive(Debug)]
pub struct Router {
    config: RouterConfig,
    tree: RouteTree,
    localizer: Localizer,
    defaults: Defaults,
}

impl Router {
    /// Compiles the declarations in `config`.
    ///
    /// `callables` validates the default filter and every explicit filter.
    pub fn build(config: &DispatchConfig, callables: &dyn CallableCheck) -> Result<Self, RouteError> {
        let router_config = config.router.clone();
        if let Some(filter) = router_config.default_filter() {
            callables.ensure_callable(&HandlerRef::parse(filter))?;
        }

        let defaults = Defaults::from_config(&router_config);
        let tree = RouteTree::build(&config.routes, &defaults, callables)?;
        let localizer = Localizer::new(
            &router_config.locale,
            &router_config.root,
            &config.localizations,
        );

        metrics::record_compiled_routes(tree.route_count());
        tracing::info!(
            routes = tree.route_count(),
            root = %router_config.root,
            locale = %router_config.locale,
            autoload = router_config.allow_autoload,
            "Router compiled"
        );

        Ok(Self {
            config: router_config,
            tree,
            localizer,
            defaults,
        })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn tree(&self) -> &RouteTree {
        &self.tree
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// The configured root prefix.
    pub fn root(&self) -> &str {
        &self.config.root
    }

    /// Matches a raw request target (path plus optional query).
    pub fn match_request(&self, target: &str, method: &str, callables: &dyn CallableCheck) -> Walk {
        let path = strip_root(request_path(target), &self.config.root);
        Matcher::new(self, callables).walk(&tokenize(path), &method.to_uppercase())
    }

    /// Canonical route to its user-facing form under the root.
    pub fn localize(&self, route: &str, params: Option<&Params>) -> String {
        self.localizer.localize(route, params)
    }

    /// User-facing path back to canonical segments.
    pub fn unlocalize(&self, path: &str) -> String {
        self.localizer.unlocalize(path)
    }
}
