//! Route matching logic.
//!
//! # Responsibilities
//! - Walk de-localized segments through the route tree
//! - Capture parameter values and record the route trail
//! - Fall back to controller/method naming conventions when allowed
//!
//! # Design Decisions
//! - Literal children always win over the parameter child
//! - The walk never backtracks: one failed step ends tree matching
//! - Convention lookups only probe on the last segment; earlier segments are
//!   folded into the controller path unchecked
//! - A matched node without a record for the method is no match at all

use serde::Serialize;

use crate::handler::CallableCheck;
use crate::routing::method::Method;
use crate::routing::params::Params;
use crate::routing::path::{join, SEPARATOR};
use crate::routing::router::Router;
use crate::routing::target::{HandlerRef, TargetRecord, PARAM_MARKER};

/// How a target was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// A declared route matched.
    Route,
    /// Resolved by controller/method naming convention.
    Convention,
    /// Nothing matched.
    Unmatched,
}

/// Result of walking one request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub target: Option<TargetRecord>,
    pub params: Params,
    /// Consumed segments; captures appear as `$name`.
    pub trail: Vec<String>,
    /// De-localized request path, `/`-prefixed.
    pub path: String,
    pub resolution: Resolution,
}

impl MatchResult {
    /// The route trail, optionally without parameter markers.
    pub fn route(&self, clean: bool) -> String {
        if clean {
            let kept: Vec<&str> = self
                .trail
                .iter()
                .map(String::as_str)
                .filter(|s| !s.starts_with(PARAM_MARKER))
                .collect();
            join(&kept)
        } else {
            join(&self.trail)
        }
    }

    pub fn is_match(&self) -> bool {
        self.target.is_some()
    }
}

/// Outcome of a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Walk {
    Complete(MatchResult),
    /// A segment carried the forbidden prefix; nothing was traversed.
    Forbidden { prefix: String, path: String },
}

/// Walks paths through a router's tree.
pub struct Matcher<'r> {
    router: &'r Router,
    callables: &'r dyn CallableCheck,
}

impl<'r> Matcher<'r> {
    pub fn new(router: &'r Router, callables: &'r dyn CallableCheck) -> Self {
        Self { router, callables }
    }

    /// Matches `segments` (already root-stripped) for `method`.
    pub fn walk(&self, segments: &[&str], method: &str) -> Walk {
        let config = self.router.config();
        if let Some(prefix) = config.forbidden_prefix() {
            if segments.iter().any(|s| s.starts_with(prefix)) {
                return Walk::Forbidden {
                    prefix: prefix.to_string(),
                    path: format!("{}{}", SEPARATOR, join(segments)),
                };
            }
        }

        let tree = self.router.tree();
        let localizer = self.router.localizer();
        let method = method.parse::<Method>().ok();

        let mut current = Some(tree.root());
        let mut params = Params::new();
        let mut trail: Vec<String> = Vec::with_capacity(segments.len());
        let mut canonical: Vec<&str> = Vec::with_capacity(segments.len());
        let mut controller_path = String::new();
        let mut convention = None;
        let last = segments.len().saturating_sub(1);

        for (index, raw) in segments.iter().enumerate() {
            let segment = localizer.unlocalize_segment(raw);
            canonical.push(segment);

            if let Some(node) = current {
                if let Some(child) = tree.static_child(node, segment) {
                    current = Some(child);
                    trail.push(segment.to_string());
                    continue;
                }
                if let Some((name, child)) = tree.node(node).param() {
                    params.push(name, segment);
                    current = Some(child);
                    trail.push(format!("{}{}", PARAM_MARKER, name));
                    continue;
                }
            }

            current = None;
            if !config.allow_autoload {
                tracing::debug!(segment, "No route edge for segment");
                canonical.extend(segments[index + 1..].iter().map(|s| localizer.unlocalize_segment(s)));
                break;
            }

            let piece = segment.replace('-', "_");
            if index == last {
                convention = self.convention_target(&controller_path, &piece);
            }
            controller_path = if controller_path.is_empty() {
                piece
            } else {
                format!("{}{}{}", controller_path, SEPARATOR, piece)
            };
            trail.push(segment.to_string());
        }

        let (target, resolution) = match convention {
            Some(target) => (Some(target), Resolution::Convention),
            None => {
                let target = current.and_then(|node| tree.node(node).target_for(method).cloned());
                let resolution = if target.is_some() {
                    Resolution::Route
                } else {
                    Resolution::Unmatched
                };
                (target, resolution)
            }
        };

        tracing::debug!(
            route = %join(&trail),
            resolution = ?resolution,
            captured = params.len(),
            "Walk finished"
        );

        Walk::Complete(MatchResult {
            target,
            params,
            trail,
            path: format!("{}{}", SEPARATOR, join(&canonical)),
            resolution,
        })
    }

    /// Probes the conventional candidates for the final segment.
    fn convention_target(&self, controller_path: &str, piece: &str) -> Option<TargetRecord> {
        let config = self.router.config();
        let candidates = if controller_path.is_empty() {
            [
                HandlerRef::method(config.default_controller.as_str(), piece),
                HandlerRef::method(piece, config.default_method.as_str()),
            ]
        } else {
            [
                HandlerRef::method(controller_path, piece),
                HandlerRef::method(
                    format!("{}{}{}", controller_path, SEPARATOR, piece),
                    config.default_method.as_str(),
                ),
            ]
        };

        let handler = candidates
            .into_iter()
            .find(|candidate| self.callables.is_callable(candidate))?;
        tracing::debug!(handler = %handler, "Resolved by convention");

        let defaults = self.router.defaults();
        Some(TargetRecord {
            handler,
            filter: defaults.filter.clone(),
            redirect: defaults.redirect.clone(),
        })
    }
}
