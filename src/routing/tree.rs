//! Compiled route tree.
//!
//! # Responsibilities
//! - Turn ordered declarations into a segment-keyed prefix tree
//! - Enforce one parameter name per tree position
//! - Register a target record per declared method at the terminal node
//!
//! # Design Decisions
//! - Nodes live in an arena and refer to each other by `NodeId`
//! - Literal keys are lower-cased on insertion and on lookup
//! - Later declarations overwrite earlier records for the same node and method

use std::collections::HashMap;

use crate::config::RouteConfig;
use crate::config::RouterConfig;
use crate::error::RouteError;
use crate::handler::CallableCheck;
use crate::routing::method::Method;
use crate::routing::path::tokenize;
use crate::routing::target::{CallSpec, HandlerRef, RedirectSpec, TargetRecord, PARAM_MARKER};

/// Parameter names may not begin with this marker.
pub const RESERVED_MARKER: char = '_';

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
pub struct RouteNode {
    statics: HashMap<String, NodeId>,
    param: Option<(String, NodeId)>,
    targets: HashMap<Method, TargetRecord>,
}

impl RouteNode {
    /// The record for `ANY`, else the record for `method`.
    pub fn target_for(&self, method: Option<Method>) -> Option<&TargetRecord> {
        self.targets
            .get(&Method::Any)
            .or_else(|| method.and_then(|m| self.targets.get(&m)))
    }

    pub fn targets(&self) -> impl Iterator<Item = (&Method, &TargetRecord)> {
        self.targets.iter()
    }

    pub fn param(&self) -> Option<(&str, NodeId)> {
        self.param.as_ref().map(|(name, id)| (name.as_str(), *id))
    }
}

/// Defaults applied to declarations that leave filter or redirect out.
#[derive(Debug, Clone, Default)]
pub struct Defaults {
    pub filter: Option<CallSpec>,
    pub redirect: Option<RedirectSpec>,
    pub route: Option<String>,
}

impl Defaults {
    pub fn from_config(config: &RouterConfig) -> Self {
        Self {
            filter: config.default_filter().map(CallSpec::parse),
            redirect: config.default_redirect().map(RedirectSpec::parse),
            route: config.default_route().map(str::to_string),
        }
    }
}

/// Immutable prefix tree of route declarations.
#[derive(Debug)]
pub struct RouteTree {
    nodes: Vec<RouteNode>,
    routes: usize,
}

impl Default for RouteTree {
    fn default() -> Self {
        Self {
            nodes: vec![RouteNode::default()],
            routes: 0,
        }
    }
}

impl RouteTree {
    /// Compiles `declarations` in order.
    pub fn build(
        declarations: &[RouteConfig],
        defaults: &Defaults,
        callables: &dyn CallableCheck,
    ) -> Result<Self, RouteError> {
        let mut tree = RouteTree::default();
        for declaration in declarations {
            tree.insert(declaration, defaults, callables)?;
        }
        tracing::debug!(
            routes = tree.routes,
            nodes = tree.nodes.len(),
            "Route tree compiled"
        );
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &RouteNode {
        &self.nodes[id.0]
    }

    /// Number of declarations compiled into the tree.
    pub fn route_count(&self) -> usize {
        self.routes
    }

    /// Case-insensitive literal child of `id`.
    pub fn static_child(&self, id: NodeId, segment: &str) -> Option<NodeId> {
        self.node(id).statics.get(&segment.to_lowercase()).copied()
    }

    fn push(&mut self) -> NodeId {
        self.nodes.push(RouteNode::default());
        NodeId(self.nodes.len() - 1)
    }

    fn insert(
        &mut self,
        declaration: &RouteConfig,
        defaults: &Defaults,
        callables: &dyn CallableCheck,
    ) -> Result<(), RouteError> {
        let pattern = declaration.pattern.as_str();
        let mut current = self.root();

        for segment in tokenize(pattern) {
            current = match segment.strip_prefix(PARAM_MARKER) {
                Some(name) => self.param_child(current, pattern, name)?,
                None => self.literal_child(current, segment),
            };
        }

        let records = target_records(declaration, defaults, callables)?;
        let node = &mut self.nodes[current.0];
        for (method, record) in records {
            if let Some(previous) = node.targets.insert(method, record) {
                tracing::debug!(
                    pattern,
                    method = %method,
                    previous = %previous.handler,
                    "Route target overwritten"
                );
            }
        }
        self.routes += 1;
        Ok(())
    }

    fn param_child(
        &mut self,
        at: NodeId,
        pattern: &str,
        name: &str,
    ) -> Result<NodeId, RouteError> {
        if name.is_empty() {
            return Err(RouteError::invalid(pattern, "route parameter must be named"));
        }
        if name.starts_with(RESERVED_MARKER) {
            return Err(RouteError::invalid(
                pattern,
                format!(
                    "route parameter '{}' cannot begin with '{}'",
                    name, RESERVED_MARKER
                ),
            ));
        }

        match self.nodes[at.0].param.clone() {
            Some((existing, _)) if existing != name => Err(RouteError::RouteConflict {
                route: pattern.to_string(),
                existing,
                replacement: name.to_string(),
            }),
            Some((_, child)) => Ok(child),
            None => {
                let child = self.push();
                self.nodes[at.0].param = Some((name.to_string(), child));
                Ok(child)
            }
        }
    }

    fn literal_child(&mut self, at: NodeId, segment: &str) -> NodeId {
        let key = segment.to_lowercase();
        if let Some(child) = self.nodes[at.0].statics.get(&key) {
            return *child;
        }
        let child = self.push();
        self.nodes[at.0].statics.insert(key, child);
        child
    }
}

/// Builds the per-method records for one declaration.
fn target_records(
    declaration: &RouteConfig,
    defaults: &Defaults,
    callables: &dyn CallableCheck,
) -> Result<Vec<(Method, TargetRecord)>, RouteError> {
    let pattern = declaration.pattern.as_str();
    let methods = match &declaration.methods {
        Some(methods) => Method::parse_list(&methods.joined()).map_err(|method| {
            RouteError::invalid(pattern, format!("method '{}' is not allowed", method))
        })?,
        None => vec![Method::Any],
    };

    // An explicit blank filter disables the default one.
    let filter = match declaration.filter.as_deref() {
        Some(spec) => CallSpec::parse_optional(Some(spec)),
        None => defaults.filter.clone(),
    };
    if let (Some(filter), Some(_)) = (&filter, &declaration.filter) {
        callables.ensure_callable(&filter.target)?;
    }

    // An explicit blank redirect falls back to the default route.
    let redirect = match declaration.redirect.as_deref().map(str::trim) {
        Some("") => defaults.route.as_deref().map(RedirectSpec::parse),
        Some(spec) => Some(RedirectSpec::parse(spec)),
        None => defaults.redirect.clone(),
    };

    let handler = HandlerRef::parse(&declaration.target);
    Ok(methods
        .into_iter()
        .map(|method| {
            (
                method,
                TargetRecord {
                    handler: handler.clone(),
                    filter: filter.clone(),
                    redirect: redirect.clone(),
                },
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::AssumeCallable;
    use crate::handler::HandlerRegistry;

    fn build(routes: &[RouteConfig]) -> Result<RouteTree, RouteError> {
        RouteTree::build(routes, &Defaults::default(), &AssumeCallable)
    }

    fn walk(tree: &RouteTree, path: &str) -> Option<NodeId> {
        let mut current = tree.root();
        for segment in tokenize(path) {
            current = match tree.static_child(current, segment) {
                Some(child) => child,
                None => tree.node(current).param()?.1,
            };
        }
        Some(current)
    }

    #[test]
    fn test_shared_prefixes_share_nodes() {
        let tree = build(&[
            RouteConfig::new("/users/$id", "UserCtrl#show").methods("GET"),
            RouteConfig::new("/users", "UserCtrl#list").methods("GET,POST"),
            RouteConfig::new("/users/$id/posts", "PostCtrl#list"),
        ])
        .unwrap();
        assert_eq!(tree.route_count(), 3);
        // root, users, $id, posts
        assert_eq!(tree.nodes.len(), 4);

        let users = walk(&tree, "/users").unwrap();
        assert_eq!(
            tree.node(users).target_for(Some(Method::Post)).unwrap().handler,
            HandlerRef::method("UserCtrl", "list")
        );
        assert!(tree.node(users).target_for(Some(Method::Delete)).is_none());
        assert_eq!(tree.node(users).param().map(|(n, _)| n), Some("id"));
    }

    #[test]
    fn test_literals_are_case_insensitive() {
        let tree = build(&[RouteConfig::new("/About/Team", "team")]).unwrap();
        let node = walk(&tree, "/ABOUT/team").unwrap();
        assert!(tree.node(node).target_for(None).is_some());
    }

    #[test]
    fn test_conflicting_param_names_rejected() {
        let err = build(&[
            RouteConfig::new("/a/$x", "one"),
            RouteConfig::new("/a/$y/b", "two"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            RouteError::RouteConflict {
                route: "/a/$y/b".into(),
                existing: "x".into(),
                replacement: "y".into(),
            }
        );
        assert!(err.is_invalid_route());
    }

    #[test]
    fn test_reserved_and_empty_param_names_rejected() {
        assert!(build(&[RouteConfig::new("/a/$_secret", "f")])
            .unwrap_err()
            .is_invalid_route());
        assert!(build(&[RouteConfig::new("/a/$", "f")])
            .unwrap_err()
            .is_invalid_route());
    }

    #[test]
    fn test_unknown_method_rejected() {
        let err = build(&[RouteConfig::new("/a", "f").methods("GET,BREW")]).unwrap_err();
        assert!(matches!(err, RouteError::InvalidRoute { .. }));
    }

    #[test]
    fn test_any_supersedes_other_methods() {
        let tree = build(&[RouteConfig::new("/a", "f").methods("get, any")]).unwrap();
        let node = tree.node(walk(&tree, "/a").unwrap());
        let methods: Vec<_> = node.targets().map(|(m, _)| *m).collect();
        assert_eq!(methods, vec![Method::Any]);
    }

    #[test]
    fn test_later_declaration_overwrites() {
        let tree = build(&[
            RouteConfig::new("/a", "first").methods("GET"),
            RouteConfig::new("/a", "second").methods("GET"),
        ])
        .unwrap();
        let node = tree.node(walk(&tree, "/a").unwrap());
        assert_eq!(
            node.target_for(Some(Method::Get)).unwrap().handler,
            HandlerRef::Function("second".into())
        );
    }

    #[test]
    fn test_defaults_propagate() {
        let defaults = Defaults {
            filter: Some(CallSpec::parse("auth")),
            redirect: Some(RedirectSpec::parse("/login")),
            route: Some("home".into()),
        };
        let tree = RouteTree::build(
            &[
                RouteConfig::new("/a", "a").methods("GET,POST"),
                RouteConfig::new("/b", "b").filter("").redirect(""),
            ],
            &defaults,
            &AssumeCallable,
        )
        .unwrap();

        let a = tree.node(walk(&tree, "/a").unwrap());
        for (_, record) in a.targets() {
            assert_eq!(record.filter, Some(CallSpec::parse("auth")));
            assert_eq!(record.redirect, Some(RedirectSpec::parse("/login")));
        }

        let b = tree.node(walk(&tree, "/b").unwrap()).target_for(None).unwrap();
        assert_eq!(b.filter, None);
        assert_eq!(b.redirect, Some(RedirectSpec::parse("home")));
    }

    #[test]
    fn test_explicit_filter_must_be_callable() {
        let err = RouteTree::build(
            &[RouteConfig::new("/a", "a").filter("missing|$id")],
            &Defaults::default(),
            &HandlerRegistry::new(),
        )
        .unwrap_err();
        assert_eq!(err, RouteError::InvalidMethod { target: "missing".into() });
    }

    #[test]
    fn test_root_pattern_registers_on_root() {
        let tree = build(&[RouteConfig::new("/", "home")]).unwrap();
        assert!(tree.node(tree.root()).target_for(Some(Method::Get)).is_some());
    }
}
